//! Job execution engine: dispatcher and the active-jobs table.

pub mod active;
pub mod dispatcher;
