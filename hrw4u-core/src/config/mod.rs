//! User settings
//!
//! Settings only tune presentation: suggestion quality, the section used
//! for headless native rulesets, and output indentation. They never change
//! what a program compiles to.

mod loader;
mod types;

pub use loader::SettingsLoader;
pub use types::*;
