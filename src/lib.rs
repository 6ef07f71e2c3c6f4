//! Engify - content service for the Engify prompt library
//!
//! Stores prompts, patterns, workflows and the AI model/tool directories,
//! serves them over HTTP, and exposes the admin API used by the ops hub.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod imagegen;
pub mod manager;
pub mod observability;
pub mod playground;
pub mod server;
pub mod sitemap;
pub mod storage;
pub mod utils;

pub use core::{
    data::{Pattern, Prompt, PromptCollection, PromptStats, Workflow},
    operations::{Repository, Storage},
    traits::{Document, DocumentStore},
};
pub use server::{AppState, build_app};
pub use utils::error::{AppError, AppResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
