//! Integration suite: workflow service over an on-disk database.

mod fixture;
mod storage_tests;
mod workflow_tests;
