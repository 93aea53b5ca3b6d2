//! Language registry
//!
//! Maps a user-facing language name to the locale codes each collaborator
//! needs. Lookup is case-sensitive and exact-match only: guessing a language
//! for a health-advice message is a safety risk, so an unregistered name
//! fails instead of falling back to a default.

use crate::utils::error::{RelayError, Result};
use std::collections::HashMap;

/// Locale codes for one user-facing language
#[derive(Debug, Clone)]
pub struct LanguageEntry {
    /// Name shown to (and sent by) end users, e.g. "Hindi"
    pub display_name: &'static str,
    /// Locale hint for the transcription collaborator, when it wants one
    pub transcription_locale: Option<&'static str>,
    /// Label substituted into the completion prompt
    pub completion_label: &'static str,
    /// Target locale for the synthesis collaborator
    pub synthesis_locale: &'static str,
}

/// Registry of all languages exposed to end users
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    entries: HashMap<&'static str, LanguageEntry>,
}

macro_rules! language {
    ($name:expr, $transcription:expr, $synthesis:expr) => {
        LanguageEntry {
            display_name: $name,
            transcription_locale: $transcription,
            completion_label: $name,
            synthesis_locale: $synthesis,
        }
    };
}

impl LanguageRegistry {
    /// Build the registry with the default language table
    pub fn with_defaults() -> Self {
        let entries = [
            language!("English", Some("en-IN"), "en-IN"),
            language!("Hindi", Some("hi-IN"), "hi-IN"),
            language!("Odia", Some("or-IN"), "od-IN"),
            language!("Bengali", Some("bn-IN"), "bn-IN"),
            language!("Tamil", Some("ta-IN"), "ta-IN"),
            language!("Telugu", Some("te-IN"), "te-IN"),
            language!("Marathi", Some("mr-IN"), "mr-IN"),
            language!("Gujarati", Some("gu-IN"), "gu-IN"),
            language!("Kannada", Some("kn-IN"), "kn-IN"),
            language!("Malayalam", Some("ml-IN"), "ml-IN"),
            language!("Punjabi", Some("pa-IN"), "pa-IN"),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.display_name, entry))
                .collect(),
        }
    }

    /// Resolve a user-facing language name to its entry
    pub fn resolve(&self, display_name: &str) -> Result<&LanguageEntry> {
        self.entries
            .get(display_name)
            .ok_or_else(|| RelayError::UnsupportedLanguage(display_name.to_string()))
    }

    /// All registered entries
    pub fn entries(&self) -> impl Iterator<Item = &LanguageEntry> {
        self.entries.values()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
