//! The Interview Session Engine and its HTTP surface.

pub mod engine;
pub mod fallback;
pub mod handlers;
pub mod mode;
pub mod prompts;
pub mod store;
