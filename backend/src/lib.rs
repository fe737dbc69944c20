//! # Impact analysis engine
//!
//! Estimates per-camp relief requirements and risk for a disaster mission
//! and aggregates them into a mission-level risk score.
//!
//! ## Architecture
//!
//! - [`models`]: missions, camps and the analysis records derived from them
//! - [`engine`]: deterministic rule engine (urgency, requirements, risk,
//!   saturation, explanations, hybrid merge)
//! - [`predictor`]: port to the optional external ML predictor
//! - [`db`]: repository traits and the in-memory implementation
//! - [`services`]: analysis orchestration and history queries
//! - [`config`]: TOML and environment configuration
//! - [`http`]: Axum REST API (feature `http-server`)

// RepositoryError carries context for logging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod predictor;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
