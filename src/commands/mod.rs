//! CLI commands for threadview

pub mod dispatch;
pub mod links;
pub mod render;
