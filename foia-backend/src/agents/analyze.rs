//! Agency response analysis strategy
//!
//! The completion text is kept verbatim as the summary; compliance level and
//! recommended action are extracted from it by keyword scan so the shaped
//! output is deterministic for a given completion.

use crate::agents::strategy::{
    input_mismatch, AgentInput, AgentOutput, AgentStrategy, AnalysisOutput, ComplianceLevel,
    PromptPair, RecommendedAction,
};
use crate::ai::Completion;
use crate::error::AgentError;
use crate::models::TaskKind;

const SYSTEM_PROMPT: &str = "You are a FOIA response analysis expert. \
Analyze agency responses for level of compliance with the request, exemptions \
claimed and their validity, next steps or follow-up actions needed, and \
appeal opportunities.";

/// How much of the original request is quoted back into the prompt
const ORIGINAL_REQUEST_LIMIT: usize = 500;

pub struct AnalyzeStrategy;

impl AgentStrategy for AnalyzeStrategy {
    fn kind(&self) -> TaskKind {
        TaskKind::Analyze
    }

    fn validate(&self, input: &AgentInput) -> Result<(), AgentError> {
        let AgentInput::Analyze { response_text, .. } = input else {
            return Err(input_mismatch(self.kind()));
        };
        if response_text.trim().is_empty() {
            return Err(AgentError::Validation(
                "response text is required".to_string(),
            ));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &AgentInput) -> Result<PromptPair, AgentError> {
        let AgentInput::Analyze {
            response_text,
            original_request,
        } = input
        else {
            return Err(input_mismatch(self.kind()));
        };

        let user = format!(
            "Analyze this FOIA response:\n\n\
             Original Request: {}\n\n\
             Agency Response: {response_text}\n\n\
             Provide:\n\
             1. Summary of what was provided\n\
             2. What was denied or redacted (with exemptions cited)\n\
             3. Assessment of response adequacy\n\
             4. Recommended next steps (accept, follow-up, or appeal)\n\
             5. Key dates or deadlines mentioned",
            head(original_request, ORIGINAL_REQUEST_LIMIT)
        );

        Ok(PromptPair {
            system: SYSTEM_PROMPT.to_string(),
            user,
        })
    }

    fn shape_output(
        &self,
        _input: &AgentInput,
        completion: &Completion,
    ) -> Result<AgentOutput, AgentError> {
        let compliance_level = compliance_from(&completion.content);
        let recommended_action = action_from(&completion.content, compliance_level);
        Ok(AgentOutput::Analysis(AnalysisOutput {
            summary: completion.content.clone(),
            compliance_level,
            requires_followup: recommended_action != RecommendedAction::Accept,
            recommended_action,
        }))
    }
}

fn head(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn compliance_from(text: &str) -> ComplianceLevel {
    let lowered = text.to_lowercase();
    if lowered.contains("no records")
        || lowered.contains("denied in full")
        || lowered.contains("fully denied")
        || lowered.contains("glomar")
    {
        ComplianceLevel::None
    } else if lowered.contains("full compliance")
        || lowered.contains("fully compliant")
        || lowered.contains("complete production")
    {
        ComplianceLevel::Full
    } else {
        ComplianceLevel::Partial
    }
}

fn action_from(text: &str, compliance: ComplianceLevel) -> RecommendedAction {
    let lowered = text.to_lowercase();
    if lowered.contains("appeal") {
        RecommendedAction::Appeal
    } else if compliance == ComplianceLevel::Full {
        RecommendedAction::Accept
    } else {
        RecommendedAction::FollowUp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_of(content: &str) -> AnalysisOutput {
        let input = AgentInput::Analyze {
            response_text: "The agency responded.".to_string(),
            original_request: "I requested records.".to_string(),
        };
        let completion = Completion {
            content: content.to_string(),
            tokens_used: 50,
        };
        let AgentOutput::Analysis(analysis) =
            AnalyzeStrategy.shape_output(&input, &completion).unwrap()
        else {
            panic!("expected analysis output");
        };
        analysis
    }

    #[test]
    fn test_empty_response_rejected() {
        let input = AgentInput::Analyze {
            response_text: " ".to_string(),
            original_request: "records".to_string(),
        };
        assert!(matches!(
            AnalyzeStrategy.validate(&input).unwrap_err(),
            AgentError::Validation(_)
        ));
    }

    #[test]
    fn test_full_compliance_means_accept() {
        let analysis = analysis_of("The response is in full compliance with the request.");
        assert_eq!(analysis.compliance_level, ComplianceLevel::Full);
        assert_eq!(analysis.recommended_action, RecommendedAction::Accept);
        assert!(!analysis.requires_followup);
    }

    #[test]
    fn test_denial_means_none() {
        let analysis = analysis_of("The agency located no records responsive to the request.");
        assert_eq!(analysis.compliance_level, ComplianceLevel::None);
        assert!(analysis.requires_followup);
    }

    #[test]
    fn test_appeal_language_wins() {
        let analysis = analysis_of("Records were withheld under b(5); recommend filing an appeal.");
        assert_eq!(analysis.recommended_action, RecommendedAction::Appeal);
        assert!(analysis.requires_followup);
    }

    #[test]
    fn test_defaults_to_partial_followup() {
        let analysis = analysis_of("Some records were produced with redactions.");
        assert_eq!(analysis.compliance_level, ComplianceLevel::Partial);
        assert_eq!(analysis.recommended_action, RecommendedAction::FollowUp);
    }

    #[test]
    fn test_prompt_truncates_long_original_request() {
        let input = AgentInput::Analyze {
            response_text: "reply".to_string(),
            original_request: "r".repeat(2000),
        };
        let prompt = AnalyzeStrategy.build_prompt(&input).unwrap();
        assert!(prompt.user.len() < 1500);
    }
}
