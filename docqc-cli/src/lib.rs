// All checking functionality is in docqc-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod config_locator;
pub mod render;

// Re-export core types for convenience
pub use docqc_core::*;

// Re-export CLI utilities
pub use config_locator::ConfigLocator;
pub use render::{render_json, render_text};
