//! Follow-up generation strategy

use crate::agents::strategy::{
    input_mismatch, AgentInput, AgentOutput, AgentStrategy, FollowUpOutput, PromptPair, Urgency,
};
use crate::ai::Completion;
use crate::error::AgentError;
use crate::models::TaskKind;

const SYSTEM_PROMPT: &str = "You are a FOIA follow-up communication expert. \
Generate professional follow-up messages that are polite but firm, reference \
relevant deadlines and laws, are clear about what action is needed, and keep \
a professional tone.";

/// Days elapsed below which a follow-up is low urgency
const LOW_URGENCY_DAYS: i64 = 20;
/// Days elapsed above which a follow-up is high urgency
const HIGH_URGENCY_DAYS: i64 = 45;

pub struct FollowUpStrategy;

impl AgentStrategy for FollowUpStrategy {
    fn kind(&self) -> TaskKind {
        TaskKind::FollowUp
    }

    fn validate(&self, input: &AgentInput) -> Result<(), AgentError> {
        let AgentInput::FollowUp { context, .. } = input else {
            return Err(input_mismatch(self.kind()));
        };
        if context.title.trim().is_empty() {
            return Err(AgentError::Validation(
                "request title is required".to_string(),
            ));
        }
        if context.agency.trim().is_empty() {
            return Err(AgentError::Validation("agency name is required".to_string()));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &AgentInput) -> Result<PromptPair, AgentError> {
        let AgentInput::FollowUp { context, reason } = input else {
            return Err(input_mismatch(self.kind()));
        };

        let user = format!(
            "Generate a follow-up communication for:\n\n\
             Reason: {reason}\n\
             Agency: {}\n\
             Original Request: {}\n\
             Days Since Submission: {}\n\n\
             Create a professional follow-up that addresses the situation.",
            context.agency, context.title, context.days_elapsed
        );

        Ok(PromptPair {
            system: SYSTEM_PROMPT.to_string(),
            user,
        })
    }

    fn shape_output(
        &self,
        input: &AgentInput,
        completion: &Completion,
    ) -> Result<AgentOutput, AgentError> {
        let AgentInput::FollowUp { context, .. } = input else {
            return Err(input_mismatch(self.kind()));
        };
        Ok(AgentOutput::FollowUp(FollowUpOutput {
            followup_text: completion.content.clone(),
            suggested_subject: format!("Follow-up: {}", context.title),
            urgency: urgency_from_days(context.days_elapsed),
        }))
    }
}

fn urgency_from_days(days_elapsed: i64) -> Urgency {
    if days_elapsed >= HIGH_URGENCY_DAYS {
        Urgency::High
    } else if days_elapsed >= LOW_URGENCY_DAYS {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::strategy::FollowUpContext;

    fn followup_input(title: &str, agency: &str, days_elapsed: i64) -> AgentInput {
        AgentInput::FollowUp {
            context: FollowUpContext {
                title: title.to_string(),
                agency: agency.to_string(),
                days_elapsed,
            },
            reason: "no_response".to_string(),
        }
    }

    #[test]
    fn test_missing_agency_rejected() {
        let err = FollowUpStrategy
            .validate(&followup_input("Inspection records", "", 30))
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn test_urgency_scales_with_elapsed_days() {
        assert_eq!(urgency_from_days(5), Urgency::Low);
        assert_eq!(urgency_from_days(20), Urgency::Medium);
        assert_eq!(urgency_from_days(44), Urgency::Medium);
        assert_eq!(urgency_from_days(45), Urgency::High);
    }

    #[test]
    fn test_subject_references_request_title() {
        let completion = Completion {
            content: "Dear Records Officer,".to_string(),
            tokens_used: 10,
        };
        let output = FollowUpStrategy
            .shape_output(&followup_input("Inspection records", "DOT", 30), &completion)
            .unwrap();
        let AgentOutput::FollowUp(followup) = output else {
            panic!("expected follow-up output");
        };
        assert_eq!(followup.suggested_subject, "Follow-up: Inspection records");
        assert_eq!(followup.urgency, Urgency::Medium);
    }
}
