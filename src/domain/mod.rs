//! Domain layer for go-scrutinize
//!
//! Architecture: Domain Model - project identity, run outcomes and the error taxonomy
//! - Free of process spawning and file writing
//! - Shared by every pipeline stage

pub mod errors;
pub mod outcome;
pub mod project;

// Re-export main domain types for convenience
pub use errors::*;
pub use outcome::*;
pub use project::*;
