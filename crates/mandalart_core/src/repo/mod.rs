//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for plans and cells.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate plan drafts before persistence.
//! - Repository APIs return semantic errors (`PlanNotFound`, `CellNotFound`)
//!   in addition to DB transport errors.

pub mod plan_repo;
