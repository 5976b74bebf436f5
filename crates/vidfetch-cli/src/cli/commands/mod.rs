//! CLI command handlers, one file per command.

mod check;
mod cleanup;
mod fetch;
mod info;

pub use check::run_check;
pub use cleanup::run_cleanup;
pub use fetch::run_fetch;
pub use info::run_info;
