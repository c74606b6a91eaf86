//! Process execution and host environment checks.

pub mod command;
pub mod platform;

pub use command::{execute, execute_check, CommandResult, ProcessInvocation};
pub use platform::{is_ci, is_elevated, is_executable, parse_system_path, resolve_tool_path};
