//! The five built-in stages, in chain order.

mod file_sink;
mod normalize;
mod rate_enforce;
mod rate_reduce;
mod still_encode;

pub use file_sink::FileSink;
pub use normalize::FormatNormalizer;
pub use rate_enforce::RateEnforcer;
pub use rate_reduce::RateReducer;
pub use still_encode::StillEncoder;
