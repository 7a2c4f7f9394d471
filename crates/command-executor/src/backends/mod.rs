//! Backend implementations for different execution contexts
//!
//! Only local execution is provided. Other backends implement
//! [`CommandExecutor`](crate::executor::CommandExecutor) directly.

pub mod local;
pub use local::LocalExecutor;
