//! Property tests for the workflow rules.

mod engine_props;
