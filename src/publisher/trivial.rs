use std::{marker::PhantomData, sync::Arc};

use crate::{
  completion::Completion, demand::Demand, publisher::Publisher, subscriber::Subscriber,
  subscription::Subscription,
};

/// Subscription of publishers that never wait for demand.
struct InertSubscription;

impl Subscription for InertSubscription {
  #[inline]
  fn request(&self, _demand: Demand) {}

  #[inline]
  fn cancel(&self) {}
}

/// Marker for the item and failure types of a publisher that stores neither.
type TypeHint<Item, Err> = PhantomData<fn() -> (Item, Err)>;

/// Creates a publisher that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `err` - An error to fail with
pub fn fail<Item, Err>(err: Err) -> Fail<Item, Err> { Fail(err, PhantomData) }

pub struct Fail<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for Fail<Item, Err> {
  fn clone(&self) -> Self { Fail(self.0.clone(), PhantomData) }
}

impl<Item, Err> Publisher for Fail<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, mut subscriber: S)
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    subscriber.receive_subscription(Arc::new(InertSubscription));
    subscriber.receive_completion(Completion::Failed(self.0));
  }
}

/// Creates a publisher that produces no values.
///
/// Finishes immediately, regardless of demand. Never fails.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(PhantomData) }

pub struct Empty<Item, Err>(TypeHint<Item, Err>);

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err> Publisher for Empty<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, mut subscriber: S)
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    subscriber.receive_subscription(Arc::new(InertSubscription));
    subscriber.receive_completion(Completion::Finished);
  }
}

/// Creates a publisher that never emits anything and never terminates.
///
/// Combined with other sources it keeps a combination from finishing.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(PhantomData) }

pub struct Never<Item, Err>(TypeHint<Item, Err>);

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item, Err> Publisher for Never<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, mut subscriber: S)
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    subscriber.receive_subscription(Arc::new(InertSubscription));
  }
}
