//! Test utilities shared by the globuild integration tests.
//!
//! Helpers cover throwaway project trees with controllable timestamps,
//! in-process executors that record what they were asked to build, fake
//! toolchain scripts for end-to-end runs, and environment guards.

pub mod env_lock;
pub mod env_var_guard;
pub mod error;
pub mod executors;
pub mod globuild;
pub mod toolchain;
pub mod tree;

pub use env_lock::EnvLock;
pub use env_var_guard::EnvVarGuard;
pub use error::display_error_chain;
pub use executors::{FailingExecutor, RecordingExecutor};
pub use tree::ProjectTree;
