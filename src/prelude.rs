//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Flow control vocabulary
pub use crate::{completion::Completion, demand::Demand, error::DemandError};
// Operators
pub use crate::ops::{
  combine_latest::{combine_latest2, combine_latest3, combine_latest4, CombineLatest},
  into_stream::IntoStream,
  map::Map,
};
// Core traits and publishers
pub use crate::publisher::*;
// Subject
pub use crate::subject::PassthroughSubject;
// Subscriber and subscription
pub use crate::subscriber::{BoxedSubscriber, Sink, Subscriber};
pub use crate::subscription::*;
// Test helpers
pub use crate::testing::{Signal, SubscriptionEvent, TestSubject, TrackingSubscriber};
