//! Helpers for testing publishers and subscribers.
//!
//! [`TrackingSubscriber`] records everything it receives and lets the test
//! drive its subscription. [`TestSubject`] is a [`PassthroughSubject`] that
//! records the demand and cancellations its subscribers send upstream.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subject::PassthroughSubject,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionHandle},
};

/// One signal received by a [`TrackingSubscriber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<Item, Err> {
  Subscription,
  Value(Item),
  Completion(Completion<Err>),
}

struct Tracking<Item, Err> {
  history: Vec<Signal<Item, Err>>,
  subscription: Option<SubscriptionHandle>,
  initial_demand: Demand,
  demand_per_item: Demand,
}

/// Subscriber recording its signals.
///
/// Clones share the same record, so a test keeps one clone and subscribes
/// another.
///
/// ```
/// use rxlatest::prelude::*;
///
/// let tracker = TrackingSubscriber::new();
/// just(1).subscribe(tracker.clone());
/// assert_eq!(
///   tracker.history(),
///   vec![Signal::Subscription, Signal::Value(1), Signal::Completion(Completion::Finished)]
/// );
/// ```
pub struct TrackingSubscriber<Item, Err> {
  inner: Arc<Mutex<Tracking<Item, Err>>>,
}

impl<Item, Err> Clone for TrackingSubscriber<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> Default for TrackingSubscriber<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> TrackingSubscriber<Item, Err> {
  /// Requests unlimited demand when subscribed.
  pub fn new() -> Self { Self::with_demand(Demand::UNLIMITED) }

  /// Requests `initial` when subscribed and nothing more.
  pub fn with_demand(initial: Demand) -> Self { Self::with_demand_per_item(initial, Demand::NONE) }

  /// Requests `initial` when subscribed and returns `per_item` for every
  /// item received.
  pub fn with_demand_per_item(initial: Demand, per_item: Demand) -> Self {
    TrackingSubscriber {
      inner: Arc::new(Mutex::new(Tracking {
        history: vec![],
        subscription: None,
        initial_demand: initial,
        demand_per_item: per_item,
      })),
    }
  }

  /// The subscription handle, until the publisher completed or the tracker
  /// cancelled.
  pub fn subscription(&self) -> Option<SubscriptionHandle> { self.inner.lock().subscription.clone() }

  /// Requests more items through the received subscription.
  pub fn request(&self, demand: Demand) {
    let subscription = self.subscription();
    if let Some(subscription) = subscription {
      subscription.request(demand);
    }
  }

  /// Cancels the received subscription. Later calls do nothing.
  pub fn cancel(&self) {
    let subscription = self.inner.lock().subscription.take();
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }
}

impl<Item: Clone, Err: Clone> TrackingSubscriber<Item, Err> {
  pub fn history(&self) -> Vec<Signal<Item, Err>> { self.inner.lock().history.clone() }

  pub fn values(&self) -> Vec<Item> {
    self
      .inner
      .lock()
      .history
      .iter()
      .filter_map(|signal| match signal {
        Signal::Value(item) => Some(item.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn completion(&self) -> Option<Completion<Err>> {
    self.inner.lock().history.iter().find_map(|signal| match signal {
      Signal::Completion(completion) => Some(completion.clone()),
      _ => None,
    })
  }
}

impl<Item, Err> Subscriber<Item, Err> for TrackingSubscriber<Item, Err> {
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    let initial = {
      let mut tracking = self.inner.lock();
      tracking.history.push(Signal::Subscription);
      tracking.subscription = Some(subscription.clone());
      tracking.initial_demand
    };
    if !initial.is_none() {
      subscription.request(initial);
    }
  }

  fn receive(&mut self, item: Item) -> Demand {
    let mut tracking = self.inner.lock();
    tracking.history.push(Signal::Value(item));
    tracking.demand_per_item
  }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    let released = {
      let mut tracking = self.inner.lock();
      tracking.history.push(Signal::Completion(completion));
      tracking.subscription.take()
    };
    drop(released);
  }
}

/// Upstream traffic observed by a [`TestSubject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEvent {
  Requested(Demand),
  Cancelled,
}

/// A [`PassthroughSubject`] that logs the requests and cancellations of its
/// subscribers.
pub struct TestSubject<Item, Err> {
  subject: PassthroughSubject<Item, Err>,
  events: Arc<Mutex<Vec<SubscriptionEvent>>>,
}

impl<Item, Err> Clone for TestSubject<Item, Err> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone(), events: self.events.clone() } }
}

impl<Item, Err> Default for TestSubject<Item, Err> {
  fn default() -> Self { Self { subject: PassthroughSubject::new(), events: Arc::default() } }
}

impl<Item, Err> TestSubject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  pub fn events(&self) -> Vec<SubscriptionEvent> { self.events.lock().clone() }

  /// Every demand requested so far, in order.
  pub fn requests(&self) -> Vec<Demand> {
    self
      .events
      .lock()
      .iter()
      .filter_map(|event| match event {
        SubscriptionEvent::Requested(demand) => Some(*demand),
        SubscriptionEvent::Cancelled => None,
      })
      .collect()
  }

  pub fn cancellations(&self) -> usize {
    self.events.lock().iter().filter(|event| **event == SubscriptionEvent::Cancelled).count()
  }

  pub fn subscriber_count(&self) -> usize { self.subject.subscriber_count() }
}

impl<Item: Clone, Err: Clone> TestSubject<Item, Err> {
  pub fn send(&self, value: Item) { self.subject.send(value) }

  pub fn send_completion(&self, completion: Completion<Err>) {
    self.subject.send_completion(completion)
  }
}

impl<Item, Err> Publisher for TestSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    self.subject.subscribe(RecordingSubscriber { downstream: subscriber, events: self.events })
  }
}

struct RecordingSubscriber<S> {
  downstream: S,
  events: Arc<Mutex<Vec<SubscriptionEvent>>>,
}

impl<Item, Err, S> Subscriber<Item, Err> for RecordingSubscriber<S>
where
  S: Subscriber<Item, Err>,
{
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    self.downstream.receive_subscription(Arc::new(RecordingSubscription {
      upstream: subscription,
      events: self.events.clone(),
    }))
  }

  #[inline]
  fn receive(&mut self, item: Item) -> Demand { self.downstream.receive(item) }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.downstream.receive_completion(completion)
  }
}

struct RecordingSubscription {
  upstream: SubscriptionHandle,
  events: Arc<Mutex<Vec<SubscriptionEvent>>>,
}

impl Subscription for RecordingSubscription {
  fn request(&self, demand: Demand) {
    self.events.lock().push(SubscriptionEvent::Requested(demand));
    self.upstream.request(demand);
  }

  fn cancel(&self) {
    self.events.lock().push(SubscriptionEvent::Cancelled);
    self.upstream.cancel();
  }
}
