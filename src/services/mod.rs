pub mod enrichment;
pub mod generation;
pub mod pipeline;
pub mod poller;
