//! Everything between a resolved selection and a running agent.

pub mod env;
pub mod handoff;
pub mod launcher;
pub mod oauth;
pub mod supervisor;

pub use env::{build_env, current_env, EnvMap};
pub use launcher::{agent_program, SessionLauncher};
pub use supervisor::{session_summary, SelectorCommand, Supervisor, SupervisorState};
