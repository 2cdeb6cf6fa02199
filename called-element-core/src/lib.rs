//! Called-element resolution over a process repository.
//!
//! Walks every package of a process repository, recovers each process
//! definition's declared id and either resolves one target process or builds
//! the index of call targets offered to a process designer. Also answers the
//! two metadata lookups a designer needs for business-rule tasks and data
//! inputs: rule-flow-group names and fact type names.
//!
//! Backends are reached only through the traits in [`repository`] and
//! [`metadata`]; [`memory`] holds in-memory doubles, [`fs`] a directory-tree
//! backend.

pub mod error;
pub mod extract;
pub mod fs;
pub mod legacy_id;
pub mod memory;
pub mod metadata;
pub mod repository;
pub mod resolver;
pub mod response;
pub mod service;
pub mod types;
pub mod walker;

pub use error::{CalledElementError, Result};
pub use resolver::{ResolutionEngine, ResolverConfig};
pub use response::{CalledElementRequest, CalledElementResponse, RequestParams};
pub use service::{Backends, CalledElementService};
