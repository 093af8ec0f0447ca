//! Centralized error handling for the school-pages application
//!
//! The pipeline distinguishes three failure families, and the types here keep
//! them distinct all the way to the web boundary:
//!
//! - **Store errors**: cache backend failures and malformed stored rows. A
//!   store failure is never a cache miss; conflating the two would turn an
//!   outage into a regeneration storm.
//! - **Generation errors**: the content-generation collaborator failed. Fatal
//!   for the request, never retried, never cached.
//! - **Palette errors**: the color-extraction collaborator failed. Always
//!   absorbed by the generation orchestrator (a default palette is
//!   substituted), so these never reach a caller.
//!
//! Input validation lives at the web boundary and configuration problems
//! surface at startup, so neither needs a variant here.
//!
//! "No fuzzy match" is deliberately *not* an error anywhere in this crate; the
//! resolver returns `Option` and the coordinator surfaces a distinct not-found
//! outcome.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for store-layer Results
pub type StoreResult<T> = Result<T, StoreError>;
