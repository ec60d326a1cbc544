pub mod agent_suggestion;
pub mod agent_task;
pub mod foia_request;
pub mod user;

pub use agent_suggestion::AgentSuggestion;
pub use agent_task::{AgentTask, TaskKind, TaskStatus};
pub use foia_request::{Communication, Direction, FoiaRequest, NewFoiaRequest, RequestStatus};
pub use user::UserProfile;
