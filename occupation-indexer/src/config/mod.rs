//! Settings and dependency wiring for the occupation indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::Settings;
