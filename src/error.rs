//! Errors produced by the crate itself.
//!
//! Stream failures are never wrapped: every publisher carries its own failure
//! type and combinators forward it verbatim. The types here only describe
//! misuse of the protocol vocabulary.

/// Invalid conversion into or out of a [`Demand`](crate::demand::Demand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DemandError {
  /// A negative item count cannot be requested.
  #[error("demand cannot be negative, got {0}")]
  Negative(i64),

  /// Unlimited demand has no finite item count.
  #[error("unlimited demand has no finite item count")]
  Unlimited,
}
