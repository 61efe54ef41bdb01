mod capabilities;
mod client;
mod lsp_impl;
mod semantic_request_tracker;
mod settings;
mod text_sync;

pub use capabilities::server_capabilities;
pub use lsp_impl::TsClassifyLs;
pub use semantic_request_tracker::{SemanticRequestTracker, TrackedRequest};
pub use settings::{SettingsEvent, SettingsEventKind, SettingsLoadOutcome, load_settings};
