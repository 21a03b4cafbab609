//! IntoStream Operator
//!
//! This module provides the functionality to convert a `Publisher` into a
//! `futures::Stream`.
//!
//! The stream pulls from the publisher with a demand of one item per
//! consumed item, so a demand-honouring publisher never runs ahead of the
//! async consumer.
//!
//! # Example
//!
//! ```rust
//! use futures::{executor::block_on, StreamExt};
//! use rxlatest::prelude::*;
//!
//! let values: Vec<_> = block_on(from_iter(1..=3).into_stream().collect());
//! assert_eq!(values, vec![Ok(1), Ok(2), Ok(3)]);
//! ```

use std::{
  collections::VecDeque,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll, Waker},
};

use futures::Stream;
use parking_lot::Mutex;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::SubscriptionHandle,
};

/// State shared between the upstream subscriber and the stream consumer.
struct StreamState<T, E> {
  /// Items and the failure waiting to be polled.
  queue: VecDeque<Result<T, E>>,
  subscription: Option<SubscriptionHandle>,
  waker: Option<Waker>,
  /// The publisher completed or the stream was dropped.
  done: bool,
}

impl<T, E> Default for StreamState<T, E> {
  fn default() -> Self {
    Self { queue: VecDeque::new(), subscription: None, waker: None, done: false }
  }
}

/// A `Stream` that yields values emitted by a `Publisher`.
///
/// Created by [`Publisher::into_stream`]. Yields `Ok(item)` for each item,
/// `Err(err)` once when the publisher fails, then ends. Dropping the stream
/// cancels the subscription.
pub struct IntoStream<T, E> {
  state: Arc<Mutex<StreamState<T, E>>>,
}

impl<T, E> IntoStream<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  pub(crate) fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Item = T, Err = E>,
  {
    let state = Arc::new(Mutex::new(StreamState::default()));
    publisher.subscribe(StreamSubscriber { state: state.clone() });
    IntoStream { state }
  }
}

impl<T, E> Stream for IntoStream<T, E> {
  type Item = Result<T, E>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let (item, refill) = {
      let mut state = self.state.lock();
      match state.queue.pop_front() {
        Some(item) => {
          let refill = if item.is_ok() && !state.done { state.subscription.clone() } else { None };
          (item, refill)
        }
        None if state.done => return Poll::Ready(None),
        None => {
          state.waker = Some(cx.waker().clone());
          return Poll::Pending;
        }
      }
    };
    if let Some(subscription) = refill {
      subscription.request(Demand::max(1));
    }
    Poll::Ready(Some(item))
  }
}

impl<T, E> Drop for IntoStream<T, E> {
  fn drop(&mut self) {
    let subscription = {
      let mut state = self.state.lock();
      state.done = true;
      state.subscription.take()
    };
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }
}

struct StreamSubscriber<T, E> {
  state: Arc<Mutex<StreamState<T, E>>>,
}

impl<T, E> StreamSubscriber<T, E> {
  fn push(&self, item: Option<Result<T, E>>, done: bool) {
    let waker = {
      let mut state = self.state.lock();
      if let Some(item) = item {
        state.queue.push_back(item);
      }
      if done {
        state.done = true;
        state.subscription = None;
      }
      state.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<T, E> Subscriber<T, E> for StreamSubscriber<T, E> {
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    let dropped = {
      let mut state = self.state.lock();
      if !state.done {
        state.subscription = Some(subscription.clone());
      }
      state.done
    };
    if dropped {
      subscription.cancel();
    } else {
      subscription.request(Demand::max(1));
    }
  }

  fn receive(&mut self, item: T) -> Demand {
    self.push(Some(Ok(item)), false);
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<E>) {
    self.push(completion.failure().map(Err), true);
  }
}

#[cfg(test)]
mod tests {
  use futures::StreamExt;

  use crate::prelude::*;

  #[tokio::test]
  async fn receive_all_values() {
    let mut stream = from_iter(vec![1, 2, 3]).into_stream();

    let mut values: Vec<i32> = vec![];
    while let Some(Ok(x)) = stream.next().await {
      values.push(x);
    }

    assert_eq!(vec![1, 2, 3], values);
  }

  #[tokio::test]
  async fn empty_publisher_ends_the_stream() {
    let mut stream = empty::<i32, ()>().into_stream();
    assert_eq!(stream.next().await, None);
  }

  #[tokio::test]
  async fn failure_is_yielded_then_stream_ends() {
    let mut stream = fail::<i32, _>("error").into_stream();

    assert_eq!(stream.next().await, Some(Err("error")));
    assert_eq!(stream.next().await, None);
  }

  #[tokio::test]
  async fn pulls_one_item_at_a_time() {
    let source = TestSubject::<i32, ()>::new();
    let mut stream = source.clone().into_stream();
    assert_eq!(source.requests(), vec![Demand::max(1)]);

    source.send(1);
    source.send(2);
    assert_eq!(stream.next().await, Some(Ok(1)));
    assert_eq!(source.requests(), vec![Demand::max(1), Demand::max(1)]);

    source.send(3);
    source.send_completion(Completion::Finished);
    assert_eq!(stream.next().await, Some(Ok(3)));
    assert_eq!(stream.next().await, None);
  }

  #[tokio::test]
  async fn combined_values_as_stream() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let mut stream = a.clone().combine_latest_with(b.clone(), |x, y| x * y).into_stream();

    a.send(2);
    b.send(3);
    b.send(4);
    a.send_completion(Completion::Finished);
    b.send_completion(Completion::Finished);

    let values: Vec<_> = (&mut stream).collect().await;
    assert_eq!(values, vec![Ok(6), Ok(8)]);
  }

  #[test]
  fn drop_cancels_upstream() {
    let source = TestSubject::<i32, ()>::new();
    let stream = source.clone().into_stream();
    drop(stream);

    assert_eq!(source.cancellations(), 1);
  }
}
