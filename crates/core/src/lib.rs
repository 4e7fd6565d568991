//! Domain logic for the Oddsy job orchestration service.
//!
//! Everything in this crate is free of HTTP concerns: job kinds, the worker
//! process runner, liveness reporting and the live-match data model shared
//! with the mirror pipeline.

pub mod error;
pub mod jobs;
pub mod matches;
pub mod runner;
pub mod status;
pub mod types;
