//! Storage layer
//!
//! SQLite is the system of record; the in-memory repository backs tests.

pub mod memory;
pub mod migrations;
pub mod repository;
pub mod sqlite;

pub use memory::{ErrorInjection, MemoryRepository};
pub use repository::{CompetencyRepository, ItemCompletion, PathCompletion, PersistReport, WriteBatch};
pub use sqlite::{Database, DashboardStats, EmployeeSummary, NewOption};
