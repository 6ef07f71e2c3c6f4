//! Content services: validation and business rules on top of the repositories

pub mod catalog;
pub mod patterns;
pub mod prompts;
pub mod seed;
pub mod sessions;
pub mod validation;
pub mod workflows;

pub use catalog::CatalogService;
pub use patterns::{NewPattern, PatternPatch, PatternService};
pub use prompts::{NewPrompt, PromptPatch, PromptService};
pub use seed::{SeedBundle, SeedReport};
pub use sessions::SessionService;
pub use workflows::{NewWorkflow, WorkflowFilter, WorkflowPatch, WorkflowService};

/// Who is making a change, recorded on the documents they touch
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: String,
    pub email: String,
    pub role: String,
}
