pub mod invoker;
pub mod metrics;
pub mod normalizer;
pub mod providers;

pub use invoker::Invoker;
pub use metrics::RelayMetrics;
