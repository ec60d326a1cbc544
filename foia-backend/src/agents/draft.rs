//! FOIA request drafting strategy

use crate::agents::strategy::{
    input_mismatch, AgentInput, AgentOutput, AgentStrategy, DraftOutput, PromptPair,
};
use crate::ai::Completion;
use crate::error::AgentError;
use crate::models::TaskKind;

const SYSTEM_PROMPT: &str = "You are a FOIA request drafting expert. \
Draft professional, legally sound FOIA requests that are clear and specific, \
properly formatted with legal language, scope-appropriate to avoid overly \
broad rejections, and include proper fee waiver language if applicable.";

pub struct DraftStrategy;

impl AgentStrategy for DraftStrategy {
    fn kind(&self) -> TaskKind {
        TaskKind::Draft
    }

    fn validate(&self, input: &AgentInput) -> Result<(), AgentError> {
        let AgentInput::Draft {
            description,
            agency_name,
            ..
        } = input
        else {
            return Err(input_mismatch(self.kind()));
        };
        if description.trim().is_empty() {
            return Err(AgentError::Validation("description is required".to_string()));
        }
        if agency_name.trim().is_empty() {
            return Err(AgentError::Validation("agency name is required".to_string()));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &AgentInput) -> Result<PromptPair, AgentError> {
        let AgentInput::Draft {
            description,
            agency_name,
            agency_type,
        } = input
        else {
            return Err(input_mismatch(self.kind()));
        };

        let user = format!(
            "Draft a FOIA request for the following:\n\n\
             Agency: {agency_name} ({agency_type})\n\
             Request Description: {description}\n\n\
             Include:\n\
             1. Proper legal opening\n\
             2. Clear description of requested records\n\
             3. Reasonable time frame if applicable\n\
             4. Fee waiver request if appropriate\n\
             5. Contact information placeholders\n\
             6. Professional closing\n\n\
             Format the request as a complete, ready-to-send letter."
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
        Ok(AgentOutput::Draft(DraftOutput {
            request_text: completion.content.clone(),
            suggestions: vec![
                "Review the scope to ensure it's not too broad".to_string(),
                "Add specific date ranges if possible".to_string(),
                "Consider requesting electronic format".to_string(),
            ],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_input(description: &str, agency_name: &str) -> AgentInput {
        AgentInput::Draft {
            description: description.to_string(),
            agency_name: agency_name.to_string(),
            agency_type: "federal".to_string(),
        }
    }

    #[test]
    fn test_empty_description_rejected() {
        let err = DraftStrategy
            .validate(&draft_input("", "Test Agency"))
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn test_empty_agency_rejected() {
        let err = DraftStrategy
            .validate(&draft_input("records about inspections", "  "))
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn test_prompt_mentions_agency_and_description() {
        let prompt = DraftStrategy
            .build_prompt(&draft_input("inspection records", "Test Agency"))
            .unwrap();
        assert!(prompt.user.contains("Test Agency (federal)"));
        assert!(prompt.user.contains("inspection records"));
        assert!(prompt.system.contains("FOIA request drafting expert"));
    }

    #[test]
    fn test_output_carries_completion_text() {
        let completion = Completion {
            content: "Dear Records Officer,".to_string(),
            tokens_used: 10,
        };
        let output = DraftStrategy
            .shape_output(&draft_input("records", "Test Agency"), &completion)
            .unwrap();
        let AgentOutput::Draft(draft) = output else {
            panic!("expected draft output");
        };
        assert_eq!(draft.request_text, "Dear Records Officer,");
        assert_eq!(draft.suggestions.len(), 3);
    }
}
