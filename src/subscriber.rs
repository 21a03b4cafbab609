//! Subscriber trait and the closure-based [`Sink`].
//!
//! A subscriber receives, in order: exactly one subscription handle, any
//! number of items (never more than it requested), and at most one
//! completion.

use crate::{
  completion::Completion,
  demand::Demand,
  subscription::{Cancellable, SubscriptionHandle},
};

/// Consumer side of the publisher protocol.
pub trait Subscriber<Item, Err> {
  /// Called once, before anything else, with the handle used to request
  /// items and to cancel.
  fn receive_subscription(&mut self, subscription: SubscriptionHandle);

  /// Called for each item. The returned demand is added to the outstanding
  /// demand; return [`Demand::NONE`] to request nothing more.
  fn receive(&mut self, item: Item) -> Demand;

  /// Called at most once; no item follows it.
  fn receive_completion(&mut self, completion: Completion<Err>);
}

/// Object-safe subscriber, boxed by publishers that store their subscribers.
pub type BoxedSubscriber<Item, Err> = Box<dyn Subscriber<Item, Err> + Send>;

impl<Item, Err, S> Subscriber<Item, Err> for Box<S>
where
  S: Subscriber<Item, Err> + ?Sized,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    (**self).receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, item: Item) -> Demand { (**self).receive(item) }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    (**self).receive_completion(completion)
  }
}

/// Terminal subscriber that requests unlimited demand and hands every signal
/// to a closure.
///
/// Created by [`Publisher::sink`](crate::publisher::Publisher::sink).
pub struct Sink<N, C> {
  on_value: N,
  on_completion: Option<C>,
  cancellable: Cancellable,
}

impl<N, C> Sink<N, C> {
  pub(crate) fn new(on_value: N, on_completion: C, cancellable: Cancellable) -> Self {
    Sink { on_value, on_completion: Some(on_completion), cancellable }
  }
}

impl<Item, Err, N, C> Subscriber<Item, Err> for Sink<N, C>
where
  N: FnMut(Item),
  C: FnOnce(Completion<Err>),
{
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    self.cancellable.attach(subscription.clone());
    subscription.request(Demand::UNLIMITED);
  }

  fn receive(&mut self, item: Item) -> Demand {
    if !self.cancellable.is_cancelled() {
      (self.on_value)(item);
    }
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.cancellable.release();
    if self.cancellable.is_cancelled() {
      return;
    }
    if let Some(on_completion) = self.on_completion.take() {
      on_completion(completion);
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn sink_receives_values_and_completion() {
    let values = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
    let finished = std::sync::Arc::new(parking_lot::Mutex::new(None));
    let (v, f) = (values.clone(), finished.clone());

    let _token = from_iter(vec![1, 2, 3]).sink(
      move |value| v.lock().push(value),
      move |completion| *f.lock() = Some(completion),
    );

    assert_eq!(*values.lock(), vec![1, 2, 3]);
    assert_eq!(*finished.lock(), Some(Completion::Finished));
  }

  #[test]
  fn cancelled_sink_ignores_remaining_signals() {
    let subject = PassthroughSubject::<i32, &str>::new();
    let values = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
    let completed = std::sync::Arc::new(parking_lot::Mutex::new(false));
    let (v, c) = (values.clone(), completed.clone());

    let token = subject.clone().sink(move |value| v.lock().push(value), move |_| *c.lock() = true);
    subject.send(1);
    token.cancel();
    subject.send(2);
    subject.send_completion(Completion::Finished);

    assert_eq!(*values.lock(), vec![1]);
    assert!(!*completed.lock());
  }
}
