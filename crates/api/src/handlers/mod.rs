pub mod jobs;
pub mod matches;
pub mod status;
