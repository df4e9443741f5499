//! FraudGuard: transaction fraud scoring with optional on-chain recording

pub mod ai_engine;
pub mod api;
pub mod bridges;
pub mod config;
