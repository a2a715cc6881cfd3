pub mod chunk;
pub mod judge;
pub mod metrics;
pub mod plan;
