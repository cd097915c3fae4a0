//! CLI command implementations

pub mod add;
pub mod config;
pub mod get;
pub mod list;

pub use add::execute as add;
pub use config::execute as config;
pub use get::{cat, path};
pub use list::execute as list;
