//! HTTP shell for called-element resolution.

pub mod config;
pub mod error;
mod handlers;
pub mod router;
