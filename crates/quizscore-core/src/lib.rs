//! quizscore-core — Questionnaire scoring engine.
//!
//! This crate defines the instrument model, its load-time validation, and
//! the pure scoring and classification functions every questionnaire tool
//! is built on.

pub mod engine;
pub mod error;
pub mod instrument;
pub mod model;
pub mod parser;
pub mod profile;
pub mod report;
pub mod service;
pub mod session;
pub mod thresholds;
