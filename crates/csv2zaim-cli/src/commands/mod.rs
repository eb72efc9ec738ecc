//! CLI command implementations
//!
//! - `import` - Statement import (config loading, option parsing, summary)

pub mod import;

// Re-export command functions for main.rs
pub use import::*;
