//! Core request pipeline: language registry, sanitizer, collaborator
//! adapters, and the orchestrator that sequences them.

pub mod languages;
pub mod orchestrator;
pub mod providers;
pub mod sanitize;

pub use languages::{LanguageEntry, LanguageRegistry};
pub use orchestrator::{Orchestrator, RelayReply};
