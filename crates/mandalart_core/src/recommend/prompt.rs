//! Generation request builder.

use super::provider::GenerationRequest;
use crate::config::RecommendConfig;
use crate::grid::SUB_GOAL_COUNT;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that builds Mandalart goal plans. \
Always answer with one valid JSON object and nothing else.";

/// Builds the provider request for one trimmed core objective.
pub fn build_request(core_objective: &str, config: &RecommendConfig) -> GenerationRequest {
    let user_prompt = format!(
        "You are a Mandalart goal-setting coach.\n\
         \n\
         Core objective: \"{core_objective}\"\n\
         \n\
         Build a Mandalart for this objective:\n\
         1. Write exactly {SUB_GOAL_COUNT} sub-goals (`sub_goals`), each two or three words.\n\
         2. For every sub-goal write exactly {SUB_GOAL_COUNT} action items (`action_items`), \
         each at most 15 characters.\n\
         3. Action items must be concrete and doable.\n\
         4. Write everything in {language}.\n\
         \n\
         Reply with JSON only, shaped like:\n\
         {{\n\
         \x20 \"sub_goals\": [\"sub-goal 1\", \"sub-goal 2\", ...],\n\
         \x20 \"action_items\": {{\n\
         \x20   \"sub-goal 1\": [\"action 1\", \"action 2\", ...],\n\
         \x20   ...\n\
         \x20 }}\n\
         }}",
        language = config.language.trim(),
    );

    GenerationRequest {
        model: config.model.clone(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_objective_and_config() {
        let config = RecommendConfig {
            language: "English".to_string(),
            ..RecommendConfig::default()
        };
        let request = build_request("Become a senior engineer", &config);

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 2000);
        assert!(request.user_prompt.contains("\"Become a senior engineer\""));
        assert!(request.user_prompt.contains("exactly 8 sub-goals"));
        assert!(request.user_prompt.contains("in English"));
        assert!(request.user_prompt.contains("\"action_items\": {"));
        assert!(request.system_prompt.contains("JSON"));
    }
}
