//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and provider calls into use-case level APIs.
//! - Keep request handlers and the CLI decoupled from storage details.

pub mod plan_service;
pub mod recommend_service;
