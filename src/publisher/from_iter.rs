use std::{
  convert::Infallible,
  iter::{Once, Peekable},
  sync::Arc,
};

use parking_lot::Mutex;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Creates a publisher that produces values from an iterator.
///
/// Items are pulled from the iterator only against requested demand. Finishes
/// once the iterator is exhausted, without waiting for demand. Never fails.
///
/// ```
/// use rxlatest::prelude::*;
///
/// let tracker = TrackingSubscriber::with_demand(Demand::max(2));
/// from_iter(vec![1, 2, 3]).subscribe(tracker.clone());
/// assert_eq!(tracker.values(), vec![1, 2]);
///
/// tracker.request(Demand::max(1));
/// assert_eq!(tracker.values(), vec![1, 2, 3]);
/// assert_eq!(tracker.completion(), Some(Completion::Finished));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> FromIter<Iter::IntoIter>
where
  Iter: IntoIterator,
{
  FromIter(iter.into_iter())
}

/// Creates a publisher that emits `value` once and finishes.
pub fn just<Item>(value: Item) -> FromIter<Once<Item>> { from_iter(std::iter::once(value)) }

#[derive(Clone)]
pub struct FromIter<Iter>(Iter);

impl<Iter> Publisher for FromIter<Iter>
where
  Iter: Iterator + Send + 'static,
  Iter::Item: Send + 'static,
{
  type Item = Iter::Item;
  type Err = Infallible;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Iter::Item, Infallible> + Send + 'static,
  {
    let emitter = Arc::new(IterEmitter {
      state: Mutex::new(IterState {
        iter: Some(self.0.peekable()),
        demand: Demand::NONE,
        draining: true,
      }),
      subscriber: Mutex::new(Some(subscriber)),
    });

    if let Some(subscriber) = emitter.subscriber.lock().as_mut() {
      subscriber.receive_subscription(emitter.clone());
    }
    // `draining` was set up front so requests made while the subscription is
    // being delivered only accumulate; drain them now.
    emitter.drain();
  }
}

struct IterState<Iter: Iterator> {
  /// `None` once exhausted or cancelled.
  iter: Option<Peekable<Iter>>,
  demand: Demand,
  /// Set while one caller is delivering; other callers only add demand.
  draining: bool,
}

struct IterEmitter<Iter: Iterator, S> {
  state: Mutex<IterState<Iter>>,
  subscriber: Mutex<Option<S>>,
}

enum Step<Item> {
  Emit(Item),
  Finish,
  Release,
  Idle,
}

impl<Iter, S> IterEmitter<Iter, S>
where
  Iter: Iterator,
  S: Subscriber<Iter::Item, Infallible>,
{
  fn drain(&self) {
    loop {
      let step = {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let exhausted = state.iter.as_mut().map(|items| items.peek().is_none());
        match exhausted {
          None => {
            state.draining = false;
            Step::Release
          }
          Some(false) if state.demand.take_one() => {
            match state.iter.as_mut().and_then(Iterator::next) {
              Some(item) => Step::Emit(item),
              None => {
                state.iter = None;
                state.draining = false;
                Step::Finish
              }
            }
          }
          Some(false) => {
            state.draining = false;
            Step::Idle
          }
          Some(true) => {
            state.iter = None;
            state.draining = false;
            Step::Finish
          }
        }
      };

      let mut subscriber = self.subscriber.lock();
      match step {
        Step::Emit(item) => {
          let Some(downstream) = subscriber.as_mut() else { return };
          let more = downstream.receive(item);
          self.state.lock().demand += more;
        }
        Step::Finish => {
          if let Some(mut downstream) = subscriber.take() {
            downstream.receive_completion(Completion::Finished);
          }
          return;
        }
        Step::Release => {
          subscriber.take();
          return;
        }
        Step::Idle => return,
      }
    }
  }
}

impl<Iter, S> Subscription for IterEmitter<Iter, S>
where
  Iter: Iterator + Send,
  Iter::Item: Send,
  S: Subscriber<Iter::Item, Infallible> + Send,
{
  fn request(&self, demand: Demand) {
    {
      let mut state = self.state.lock();
      if state.iter.is_none() {
        return;
      }
      state.demand += demand;
      if state.draining {
        return;
      }
      state.draining = true;
    }
    self.drain();
  }

  fn cancel(&self) {
    let release = {
      let mut state = self.state.lock();
      state.iter = None;
      !state.draining
    };
    // Otherwise the draining loop sees the cleared iterator and releases the
    // subscriber itself.
    if release {
      let released = self.subscriber.lock().take();
      drop(released);
    }
  }
}
