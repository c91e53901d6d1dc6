//! Text-generation collaborator and response handling.
//!
//! # Responsibility
//! - Define the provider seam used to request goal suggestions.
//! - Build the generation request for one core objective.
//! - Extract and normalize the JSON object returned by the provider.
//!
//! # Invariants
//! - Nothing here performs network I/O; providers are injected.
//! - Parsed output always has exactly 8 sub-goals before it reaches the placer.

pub mod prompt;
pub mod provider;
pub mod response;

pub use prompt::build_request;
pub use provider::{GenerationRequest, ProviderError, TextGenerator};
pub use response::{
    extract_json_object, parse_recommendation, ParsedRecommendation, ResponseError,
};
