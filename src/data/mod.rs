// Rate-limited, cached bar acquisition
pub mod loader;
pub mod rate_limit;

pub use loader::{BarLoader, CacheKey};
pub use rate_limit::MinIntervalLimiter;
