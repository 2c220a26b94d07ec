//! Output format accepted by `--format`
//!
//! The enum lives in the core crate; `--format` goes through
//! [`parse_format`](super::parse::parse_format) so unknown values surface as
//! `ThreadError::UnknownFormat` messages.

pub use threadview_core::format::OutputFormat;
