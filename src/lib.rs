//! # rxlatest: combine-latest over a demand-driven publisher protocol
//!
//! Merges two to four independently driven publishers into one publisher of
//! tuples holding the latest item of every source.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxlatest::prelude::*;
//!
//! let prices = PassthroughSubject::<u32, ()>::new();
//! let quantities = PassthroughSubject::<u32, ()>::new();
//! let totals = TrackingSubscriber::new();
//!
//! prices
//!   .clone()
//!   .combine_latest_with(quantities.clone(), |price, quantity| price * quantity)
//!   .subscribe(totals.clone());
//!
//! prices.send(3);
//! quantities.send(2);
//! prices.send(5);
//! assert_eq!(totals.values(), vec![6, 10]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Publisher`] | Produces items for one subscriber per `subscribe` call |
//! | [`Subscriber`] | Receives a subscription, items and one completion |
//! | [`Subscription`] | Handle to request more items or cancel |
//! | [`Demand`] | How many more items a subscriber accepts |
//! | [`Completion`] | `Finished` or `Failed(err)` |
//!
//! ## Feature Flags
//!
//! - **`tracing`**: emits diagnostic events through the `tracing` crate
//!
//! [`Publisher`]: publisher::Publisher
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Demand`]: demand::Demand
//! [`Completion`]: completion::Completion

mod logging;

pub mod completion;
pub mod demand;
pub mod error;
pub mod ops;
pub mod prelude;
pub mod publisher;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod testing;

// Re-export the prelude module
pub use prelude::*;
