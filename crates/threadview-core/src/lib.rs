//! Threadview Core Library
//!
//! Flattens partially-loaded discussion threads into render-ready item
//! sequences and tracks per-post collapse state.

pub mod bundle;
pub mod collapse;
pub mod config;
pub mod deps;
pub mod error;
pub mod flatten;
pub mod format;
pub mod link;
pub mod logging;
pub mod model;
pub mod session;
pub mod source;
pub mod store;
