//! Plan and cell domain model.
//!
//! # Responsibility
//! - Define the records persisted for one Mandalart plan.
//! - Validate caller-provided plan fields before persistence.
//!
//! # Invariants
//! - Every plan owns exactly 81 cells, one per grid position.
//! - A cell's role is derived from its position, never chosen by callers.

pub mod plan;
