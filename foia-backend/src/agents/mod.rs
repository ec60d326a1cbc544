//! Agent strategies and the shared execution skeleton
//!
//! Every invocation runs the same skeleton regardless of capability: open a
//! pending ledger entry, mark it processing, validate and build the prompt,
//! call the gateway, shape the typed output, and finish the ledger entry.
//! Any failure between processing and completion is recorded on the entry
//! before it propagates, so the ledger never lies about what happened.

pub mod analyze;
pub mod draft;
pub mod follow_up;
pub mod strategy;
pub mod summarize;
pub mod worker;

pub use strategy::{
    AgentInput, AgentOutput, AgentStrategy, AnalysisOutput, ComplianceLevel, DraftOutput,
    FollowUpContext, FollowUpOutput, PromptPair, RecommendedAction, SummaryOutput, Urgency,
};

use crate::ai::LlmGateway;
use crate::db::Database;
use crate::error::AgentError;
use crate::models::{AgentTask, TaskKind};
use std::sync::Arc;

/// Resolve the strategy implementing a capability
pub fn strategy_for(kind: TaskKind) -> &'static dyn AgentStrategy {
    match kind {
        TaskKind::Draft => &draft::DraftStrategy,
        TaskKind::Analyze => &analyze::AnalyzeStrategy,
        TaskKind::FollowUp => &follow_up::FollowUpStrategy,
        TaskKind::Summarize => &summarize::SummarizeStrategy,
    }
}

/// Runs agent invocations against the ledger and the gateway
pub struct AgentExecutor {
    db: Arc<Database>,
    gateway: Arc<dyn LlmGateway>,
    model: String,
}

impl AgentExecutor {
    pub fn new(db: Arc<Database>, gateway: Arc<dyn LlmGateway>, model: impl Into<String>) -> Self {
        Self {
            db,
            gateway,
            model: model.into(),
        }
    }

    /// Open a pending ledger entry for an invocation
    pub fn open(
        &self,
        user_id: i64,
        request_id: Option<i64>,
        input: &AgentInput,
    ) -> Result<AgentTask, AgentError> {
        let payload = serde_json::to_value(input)?;
        self.db
            .create_agent_task(input.kind(), user_id, request_id, &payload, &self.model)
    }

    /// Run the full skeleton: open, process, complete or fail
    pub async fn run(
        &self,
        user_id: i64,
        request_id: Option<i64>,
        input: AgentInput,
    ) -> Result<(AgentTask, AgentOutput), AgentError> {
        let task = self.open(user_id, request_id, &input)?;
        let output = self.run_opened(&task, &input).await?;
        Ok((task, output))
    }

    /// Drive an already-opened ledger entry through processing to a terminal state
    pub async fn run_opened(
        &self,
        task: &AgentTask,
        input: &AgentInput,
    ) -> Result<AgentOutput, AgentError> {
        self.db.mark_task_processing(task.id)?;

        match self.invoke(input).await {
            Ok((output, tokens_used)) => {
                let payload = serde_json::to_value(&output)?;
                self.db.complete_agent_task(task.id, &payload, tokens_used)?;
                log::info!(
                    "[AGENT] task {} ({}) completed, {} tokens",
                    task.id,
                    task.kind,
                    tokens_used
                );
                Ok(output)
            }
            Err(e) => {
                if let Err(ledger_err) = self.db.fail_agent_task(task.id, &e.to_string()) {
                    log::error!(
                        "[AGENT] task {}: could not record failure: {}",
                        task.id,
                        ledger_err
                    );
                }
                log::error!("[AGENT] task {} ({}) failed: {}", task.id, task.kind, e);
                Err(e)
            }
        }
    }

    async fn invoke(&self, input: &AgentInput) -> Result<(AgentOutput, i64), AgentError> {
        let strategy = strategy_for(input.kind());
        strategy.validate(input)?;
        let prompt = strategy.build_prompt(input)?;
        let completion = self
            .gateway
            .generate(Some(&prompt.system), &prompt.user)
            .await?;
        let output = strategy.shape_output(input, &completion)?;
        Ok((output, completion.tokens_used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{FailingGateway, StaticGateway};
    use crate::models::TaskStatus;

    fn executor_with(gateway: Arc<dyn LlmGateway>) -> (Arc<Database>, AgentExecutor) {
        let db = Arc::new(Database::new(":memory:").unwrap());
        db.create_user("agent@example.com", true).unwrap();
        let executor = AgentExecutor::new(db.clone(), gateway, "gpt-4o");
        (db, executor)
    }

    fn draft_input(description: &str) -> AgentInput {
        AgentInput::Draft {
            description: description.to_string(),
            agency_name: "Test Agency".to_string(),
            agency_type: "federal".to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_run_completes_ledger() {
        let (db, executor) =
            executor_with(Arc::new(StaticGateway::new("Dear Records Officer,")));

        let (task, output) = executor.run(1, None, draft_input("records")).await.unwrap();
        let AgentOutput::Draft(draft) = output else {
            panic!("expected draft output");
        };
        assert_eq!(draft.request_text, "Dear Records Officer,");

        let stored = db.get_agent_task(task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert_eq!(stored.tokens_used, Some(100));
        assert_eq!(stored.output.unwrap()["request_text"], "Dear Records Officer,");
    }

    #[tokio::test]
    async fn test_validation_failure_recorded_and_raised() {
        let (db, executor) = executor_with(Arc::new(StaticGateway::new("unused")));

        let err = executor.run(1, None, draft_input("")).await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));

        let tasks = db.recent_agent_tasks(1, 10).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Failed);
        assert!(tasks[0].error.as_deref().unwrap().contains("description"));
        assert!(tasks[0].output.is_none());
    }

    #[tokio::test]
    async fn test_gateway_failure_during_analyze() {
        let (db, executor) = executor_with(Arc::new(FailingGateway));

        let input = AgentInput::Analyze {
            response_text: "The agency responded.".to_string(),
            original_request: "I requested records.".to_string(),
        };
        let err = executor.run(1, None, input).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));

        let tasks = db.recent_agent_tasks(1, 10).unwrap();
        assert_eq!(tasks[0].status, TaskStatus::Failed);
        let message = tasks[0].error.clone().unwrap();
        assert!(!message.is_empty());
        assert!(tasks[0].output.is_none());
    }

    #[tokio::test]
    async fn test_summarize_counts_words() {
        let (_db, executor) = executor_with(Arc::new(StaticGateway::new("Overview.")));

        let input = AgentInput::Summarize {
            document_content: "word ".repeat(100),
            document_type: "response".to_string(),
        };
        let (_task, output) = executor.run(1, None, input).await.unwrap();
        let AgentOutput::Summary(summary) = output else {
            panic!("expected summary output");
        };
        assert_eq!(summary.word_count, 100);
    }

    #[test]
    fn test_dispatch_covers_every_kind() {
        for kind in [
            TaskKind::Draft,
            TaskKind::Analyze,
            TaskKind::FollowUp,
            TaskKind::Summarize,
        ] {
            assert_eq!(strategy_for(kind).kind(), kind);
        }
    }
}
