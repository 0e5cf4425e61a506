pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::http::{build_router, AppState};
pub use adapters::jsonl_store::JsonlStore;
pub use adapters::memory_store::MemoryStore;
pub use config::IntakeConfig;
pub use crate::core::intake::{IntakeError, IntakeService};
pub use domain::model::{ContactMessage, NewContactMessage};
pub use domain::ports::MessageStore;
pub use utils::error::{AppError, Result, StoreError};
