// DocQC Core Library
//
// Loads a .docx once into a word index and navigation graph, then runs a
// fixed battery of twelve formatting and content rules against it.
// Main interface for producing a QC report from a document.

pub mod acronyms;
pub mod config;
pub mod document;
pub mod error;
pub mod links;
pub mod markup;
pub mod model;
pub mod navigation;
pub mod package;
pub mod processor;
pub mod rules;
pub mod types;
pub mod word_index;

// Re-export main types and functions for easy use
pub use types::*;
pub use acronyms::{AcronymRecord, AcronymTable, AcronymTableEditor};
pub use config::{ConfigManager, ConfigProfile, QcConfig};
pub use document::LoadedDocument;
pub use error::LoadError;
pub use links::{HttpLinkProber, LinkProber, LinkStatus};
pub use processor::{DocumentChecker, StepProfiler};
pub use rules::{QcRule, RuleEngine};
