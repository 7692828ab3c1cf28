pub mod languages;
pub mod run;

pub use languages::{LanguageEntry, LanguageRegistry};
pub use run::{RunFailure, RunRequest, RunResult};
