//! Publisher trait and the basic publishers.
//!
//! A [`Publisher`] delivers items to one [`Subscriber`] per `subscribe` call.
//! Every operator of this crate is a publisher wrapping other publishers, and
//! the fluent methods on the trait build those wrappers.

use crate::{
  completion::Completion,
  ops::{combine_latest::CombineLatest, into_stream::IntoStream, map::Map},
  subscriber::{Sink, Subscriber},
  subscription::Cancellable,
};

mod from_iter;
mod trivial;

pub use from_iter::*;
pub use trivial::*;

/// Producer side of the publisher protocol.
///
/// `subscribe` consumes the publisher: it hands the subscriber a
/// subscription handle (synchronously, before returning or later from
/// another thread) and delivers items only against requested demand.
pub trait Publisher {
  type Item;
  type Err;

  /// Attaches `subscriber` to this publisher.
  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + Send + 'static;

  /// Transforms every item with `f`.
  ///
  /// ```
  /// use rxlatest::prelude::*;
  ///
  /// let tracker = TrackingSubscriber::new();
  /// from_iter(1..=3).map(|v| v * 10).subscribe(tracker.clone());
  /// assert_eq!(tracker.values(), vec![10, 20, 30]);
  /// ```
  fn map<F, B>(self, f: F) -> Map<Self, F>
  where
    Self: Sized,
    F: FnMut(Self::Item) -> B,
  {
    Map::new(self, f)
  }

  /// Combines this publisher with `other`, emitting a tuple of the latest
  /// items of both every time either of them emits, once both emitted at
  /// least once.
  ///
  /// Completes when both complete, fails as soon as either fails.
  ///
  /// ```
  /// use rxlatest::prelude::*;
  ///
  /// let a = PassthroughSubject::<i32, ()>::new();
  /// let b = PassthroughSubject::<&str, ()>::new();
  /// let tracker = TrackingSubscriber::new();
  /// a.clone().combine_latest(b.clone()).subscribe(tracker.clone());
  ///
  /// a.send(1);
  /// a.send(2);
  /// b.send("x");
  /// a.send(3);
  /// assert_eq!(tracker.values(), vec![(2, "x"), (3, "x")]);
  /// ```
  fn combine_latest<B>(self, other: B) -> CombineLatest<(Self, B)>
  where
    Self: Sized,
    B: Publisher<Err = Self::Err>,
  {
    CombineLatest::new((self, other))
  }

  /// Like [`combine_latest`](Publisher::combine_latest) with three sources.
  fn combine_latest3<B, C>(self, b: B, c: C) -> CombineLatest<(Self, B, C)>
  where
    Self: Sized,
    B: Publisher<Err = Self::Err>,
    C: Publisher<Err = Self::Err>,
  {
    CombineLatest::new((self, b, c))
  }

  /// Like [`combine_latest`](Publisher::combine_latest) with four sources.
  fn combine_latest4<B, C, D>(self, b: B, c: C, d: D) -> CombineLatest<(Self, B, C, D)>
  where
    Self: Sized,
    B: Publisher<Err = Self::Err>,
    C: Publisher<Err = Self::Err>,
    D: Publisher<Err = Self::Err>,
  {
    CombineLatest::new((self, b, c, d))
  }

  /// Combines with `other` and maps every pair of latest items through `f`.
  ///
  /// ```
  /// use rxlatest::prelude::*;
  ///
  /// let tracker = TrackingSubscriber::new();
  /// just(100).combine_latest_with(from_iter(1..=3), |a, b| a + b).subscribe(tracker.clone());
  /// assert_eq!(tracker.values(), vec![101, 102, 103]);
  /// ```
  fn combine_latest_with<B, F, T>(
    self,
    other: B,
    mut f: F,
  ) -> impl Publisher<Item = T, Err = Self::Err>
  where
    Self: Sized,
    B: Publisher<Err = Self::Err>,
    Self::Item: Clone + Send + 'static,
    B::Item: Clone + Send + 'static,
    Self::Err: Send + 'static,
    F: FnMut(Self::Item, B::Item) -> T + Send + 'static,
  {
    self.combine_latest(other).map(move |(x, y): (Self::Item, B::Item)| f(x, y))
  }

  /// Three-source [`combine_latest_with`](Publisher::combine_latest_with).
  fn combine_latest3_with<B, C, F, T>(
    self,
    b: B,
    c: C,
    mut f: F,
  ) -> impl Publisher<Item = T, Err = Self::Err>
  where
    Self: Sized,
    B: Publisher<Err = Self::Err>,
    C: Publisher<Err = Self::Err>,
    Self::Item: Clone + Send + 'static,
    B::Item: Clone + Send + 'static,
    C::Item: Clone + Send + 'static,
    Self::Err: Send + 'static,
    F: FnMut(Self::Item, B::Item, C::Item) -> T + Send + 'static,
  {
    self
      .combine_latest3(b, c)
      .map(move |(x, y, z): (Self::Item, B::Item, C::Item)| f(x, y, z))
  }

  /// Four-source [`combine_latest_with`](Publisher::combine_latest_with).
  fn combine_latest4_with<B, C, D, F, T>(
    self,
    b: B,
    c: C,
    d: D,
    mut f: F,
  ) -> impl Publisher<Item = T, Err = Self::Err>
  where
    Self: Sized,
    B: Publisher<Err = Self::Err>,
    C: Publisher<Err = Self::Err>,
    D: Publisher<Err = Self::Err>,
    Self::Item: Clone + Send + 'static,
    B::Item: Clone + Send + 'static,
    C::Item: Clone + Send + 'static,
    D::Item: Clone + Send + 'static,
    Self::Err: Send + 'static,
    F: FnMut(Self::Item, B::Item, C::Item, D::Item) -> T + Send + 'static,
  {
    self
      .combine_latest4(b, c, d)
      .map(move |(w, x, y, z): (Self::Item, B::Item, C::Item, D::Item)| f(w, x, y, z))
  }

  /// Subscribes with closures and unlimited demand.
  ///
  /// The returned token cancels the subscription; dropping it does not (see
  /// [`Cancellable::cancel_when_dropped`]).
  fn sink<N, C>(self, on_value: N, on_completion: C) -> Cancellable
  where
    Self: Sized,
    N: FnMut(Self::Item) + Send + 'static,
    C: FnOnce(Completion<Self::Err>) + Send + 'static,
  {
    let cancellable = Cancellable::new();
    self.subscribe(Sink::new(on_value, on_completion, cancellable.clone()));
    cancellable
  }

  /// Converts into a `futures::Stream` of `Result<Item, Err>` that requests
  /// one item at a time.
  fn into_stream(self) -> IntoStream<Self::Item, Self::Err>
  where
    Self: Sized,
    Self::Item: Send + 'static,
    Self::Err: Send + 'static,
  {
    IntoStream::new(self)
  }
}
