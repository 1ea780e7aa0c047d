// Core modules
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod gateway;
pub mod indicators;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use crate::config::AnalyzerConfig;
pub use error::{ConfigError, GatewayError, PipelineError};
pub use gateway::MarketDataGateway;
pub use models::*;
pub use strategy::PriceActionAnalyzer;
