pub mod job;
pub mod lead;
pub mod report;
