//! Recommendation use-case service.
//!
//! # Responsibility
//! - Validate the core objective, call the text-generation provider once,
//!   decode its answer and place it onto the grid.
//! - Translate every failure into a human-readable message for end users.
//!
//! # Invariants
//! - Exactly one provider attempt per request; no retries.
//! - Only a validated 8-sub-goal recommendation reaches `grid::place`.

use crate::config::{ConfigError, RecommendConfig};
use crate::grid::{place, Placement, SUB_GOAL_COUNT};
use crate::recommend::response::ResponseError;
use crate::recommend::{build_request, parse_recommendation, ProviderError, TextGenerator};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for recommendation requests.
#[derive(Debug)]
pub enum RecommendError {
    /// Trimmed objective is shorter than the configured minimum.
    ObjectiveTooShort { min_chars: usize },
    /// Provider call failed.
    Provider(ProviderError),
    /// Provider answered with blank text.
    EmptyResponse,
    /// Provider text could not be decoded into a recommendation.
    Response(ResponseError),
}

impl RecommendError {
    /// Message suitable for showing to the person who made the request.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ObjectiveTooShort { .. } => {
                "Please describe your goal in a bit more detail (for example: become a senior developer in 2026)."
            }
            Self::Provider(_) | Self::EmptyResponse => {
                "Could not load AI recommendations. Please try again."
            }
            Self::Response(ResponseError::NoJsonObject | ResponseError::Malformed(_)) => {
                "Could not process the AI response. Please try again."
            }
            Self::Response(
                ResponseError::MissingSubGoals | ResponseError::InvalidSubGoalCount(_),
            ) => "The AI recommendation had an unexpected format. Please try again.",
        }
    }

    /// Whether the caller, rather than the provider, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ObjectiveTooShort { .. })
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ObjectiveTooShort { .. } => "objective_too_short",
            Self::Provider(_) => "provider_failed",
            Self::EmptyResponse => "empty_response",
            Self::Response(ResponseError::NoJsonObject) => "no_json_object",
            Self::Response(ResponseError::Malformed(_)) => "malformed_json",
            Self::Response(ResponseError::MissingSubGoals) => "missing_sub_goals",
            Self::Response(ResponseError::InvalidSubGoalCount(_)) => "invalid_sub_goal_count",
        }
    }
}

impl Display for RecommendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectiveTooShort { min_chars } => write!(
                f,
                "core objective must have at least {min_chars} characters"
            ),
            Self::Provider(err) => write!(f, "{err}"),
            Self::EmptyResponse => write!(f, "provider returned an empty response"),
            Self::Response(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecommendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Response(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for RecommendError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<ResponseError> for RecommendError {
    fn from(value: ResponseError) -> Self {
        Self::Response(value)
    }
}

/// A decoded recommendation together with its grid placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Trimmed objective as placed at the grid center.
    pub core_objective: String,
    pub sub_goals: [String; SUB_GOAL_COUNT],
    /// Action items per sub-goal slot.
    pub action_items: [Vec<String>; SUB_GOAL_COUNT],
    /// Ready for `PlanService::create_plan`.
    pub placements: Vec<Placement>,
}

/// Recommendation service over an injected text generator.
pub struct RecommendService<G: TextGenerator> {
    generator: G,
    config: RecommendConfig,
}

impl<G: TextGenerator> RecommendService<G> {
    /// Creates a service after validating `config`.
    pub fn new(generator: G, config: RecommendConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { generator, config })
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Generates and places a Mandalart for `core_objective`.
    ///
    /// # Errors
    /// - `ObjectiveTooShort` before any provider call.
    /// - `Provider`, `EmptyResponse` or `Response` for provider-side failures;
    ///   none of them is retried.
    pub fn recommend(&self, core_objective: &str) -> Result<Recommendation, RecommendError> {
        let started_at = Instant::now();
        let result = self.recommend_inner(core_objective);
        match &result {
            Ok(recommendation) => info!(
                "event=recommend module=recommend status=ok provider={} duration_ms={} placements={}",
                self.generator.provider_id(),
                started_at.elapsed().as_millis(),
                recommendation.placements.len()
            ),
            Err(err) => error!(
                "event=recommend module=recommend status=error provider={} duration_ms={} error_code={} error={}",
                self.generator.provider_id(),
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            ),
        }
        result
    }

    fn recommend_inner(&self, core_objective: &str) -> Result<Recommendation, RecommendError> {
        let core_objective = core_objective.trim();
        if core_objective.chars().count() < self.config.min_objective_chars {
            return Err(RecommendError::ObjectiveTooShort {
                min_chars: self.config.min_objective_chars,
            });
        }

        let request = build_request(core_objective, &self.config);
        let text = self.generator.generate(&request)?;
        if text.trim().is_empty() {
            return Err(RecommendError::EmptyResponse);
        }

        let parsed = parse_recommendation(&text)?;
        let placements = place(core_objective, &parsed.sub_goals, &parsed.action_items);

        Ok(Recommendation {
            core_objective: core_objective.to_string(),
            sub_goals: parsed.sub_goals,
            action_items: parsed.action_items.into_slots(),
            placements,
        })
    }
}
