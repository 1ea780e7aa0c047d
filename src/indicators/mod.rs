// Statistical helpers used by the zone detector

pub mod statistics;

pub use statistics::{max_value, mean, min_value, rolling_std, sample_std_dev};
