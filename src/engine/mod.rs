//! Engine module - Run execution
//!
//! - `local`: in-process JavaScript with injected `prompt`/`console`
//! - `remote`: Piston HTTP client for every other registered language
//! - `dispatch`: picks one of the two for a run request
//!
//! The engine module does NOT:
//! - Know about editor state or sessions
//! - Retry, time out or queue runs

pub mod console;
pub mod dispatch;
pub mod local;
pub mod remote;

pub use dispatch::RunDispatcher;
pub use local::{LocalSandbox, SandboxLimits};
pub use remote::PistonClient;
