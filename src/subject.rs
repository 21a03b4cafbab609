//! Multicasting subject.
//!
//! A [`PassthroughSubject`] is both the entry point for imperative code
//! (`send`, `send_completion`) and a [`Publisher`] any number of subscribers
//! can attach to.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::{
  completion::Completion,
  demand::Demand,
  logging::log_trace,
  publisher::Publisher,
  subscriber::{BoxedSubscriber, Subscriber},
  subscription::Subscription,
};

/// Broadcasts values to its current subscribers.
///
/// A value is delivered only to subscribers with outstanding demand; the
/// others miss it. The completion is delivered to every current subscriber
/// and replayed to subscribers attaching afterwards. Values and completions
/// sent after the completion are ignored.
///
/// A value sent from inside one of the subject's own subscribers is queued
/// and delivered after the callback in progress returns.
pub struct PassthroughSubject<Item, Err> {
  inner: Arc<Mutex<SubjectState<Item, Err>>>,
}

struct SubjectState<Item, Err> {
  conduits: SmallVec<[Arc<Conduit<Item, Err>>; 1]>,
  completion: Option<Completion<Err>>,
}

impl<Item, Err> Clone for PassthroughSubject<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> Default for PassthroughSubject<Item, Err> {
  fn default() -> Self {
    Self {
      inner: Arc::new(Mutex::new(SubjectState { conduits: SmallVec::new(), completion: None })),
    }
  }
}

impl<Item, Err> PassthroughSubject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Number of subscribers that are neither cancelled nor completed.
  pub fn subscriber_count(&self) -> usize {
    self.inner.lock().conduits.iter().filter(|c| !c.is_closed()).count()
  }

  pub fn is_completed(&self) -> bool { self.inner.lock().completion.is_some() }
}

impl<Item, Err> PassthroughSubject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  /// Delivers `value` to every subscriber with outstanding demand.
  pub fn send(&self, value: Item) {
    let conduits = {
      let mut state = self.inner.lock();
      if state.completion.is_some() {
        return;
      }
      state.conduits.retain(|c| !c.is_closed());
      state.conduits.clone()
    };
    for conduit in conduits {
      conduit.offer(value.clone());
    }
  }

  /// Terminates every subscriber with `completion`.
  pub fn send_completion(&self, completion: Completion<Err>) {
    let conduits = {
      let mut state = self.inner.lock();
      if state.completion.is_some() {
        return;
      }
      state.completion = Some(completion.clone());
      std::mem::take(&mut state.conduits)
    };
    for conduit in conduits {
      conduit.terminate(completion.clone());
    }
  }
}

impl<Item, Err> Publisher for PassthroughSubject<Item, Err>
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
    let conduit = Arc::new(Conduit::new(Box::new(subscriber)));
    let replay = {
      let mut state = self.inner.lock();
      match &state.completion {
        Some(completion) => Some(completion.clone()),
        None => {
          state.conduits.retain(|c| !c.is_closed());
          state.conduits.push(conduit.clone());
          None
        }
      }
    };

    if let Some(downstream) = conduit.subscriber.lock().as_mut() {
      downstream.receive_subscription(conduit.clone());
    }
    // The conduit starts out delivering, so values sent and cancels made
    // while the subscription is being delivered are handled here.
    conduit.drain();
    if let Some(completion) = replay {
      conduit.terminate(completion);
    }
  }
}

/// Link between a subject and one subscriber; doubles as that subscriber's
/// subscription.
///
/// Only the caller that set `delivering` touches the subscriber. A value or
/// completion arriving meanwhile, from another thread or from inside the
/// subscriber's own callback, is queued and delivered by that caller.
struct Conduit<Item, Err> {
  state: Mutex<ConduitState<Item, Err>>,
  subscriber: Mutex<Option<BoxedSubscriber<Item, Err>>>,
}

struct ConduitState<Item, Err> {
  demand: Demand,
  queue: VecDeque<Item>,
  completion: Option<Completion<Err>>,
  /// A completion was accepted; later values are ignored.
  terminated: bool,
  cancelled: bool,
  delivering: bool,
}

enum Step<Item, Err> {
  Emit(Item),
  Finish(Completion<Err>),
  Release,
  Idle,
}

impl<Item, Err> Conduit<Item, Err> {
  fn new(subscriber: BoxedSubscriber<Item, Err>) -> Self {
    Conduit {
      state: Mutex::new(ConduitState {
        demand: Demand::NONE,
        queue: VecDeque::new(),
        completion: None,
        terminated: false,
        cancelled: false,
        delivering: true,
      }),
      subscriber: Mutex::new(Some(subscriber)),
    }
  }

  fn is_closed(&self) -> bool {
    let state = self.state.lock();
    state.cancelled || state.terminated
  }

  fn offer(&self, value: Item) {
    {
      let mut state = self.state.lock();
      if state.cancelled || state.terminated {
        return;
      }
      if !state.demand.take_one() {
        log_trace!("subject dropped a value: subscriber has no outstanding demand");
        return;
      }
      state.queue.push_back(value);
      if state.delivering {
        return;
      }
      state.delivering = true;
    }
    self.drain();
  }

  fn terminate(&self, completion: Completion<Err>) {
    {
      let mut state = self.state.lock();
      if state.cancelled || state.terminated {
        return;
      }
      state.terminated = true;
      state.completion = Some(completion);
      if state.delivering {
        return;
      }
      state.delivering = true;
    }
    self.drain();
  }

  /// Delivers queued signals until the queue is empty. Callers set
  /// `delivering` first.
  fn drain(&self) {
    loop {
      let step = {
        let mut state = self.state.lock();
        if state.cancelled {
          state.queue.clear();
          state.completion = None;
          state.delivering = false;
          Step::Release
        } else if let Some(value) = state.queue.pop_front() {
          Step::Emit(value)
        } else if let Some(completion) = state.completion.take() {
          state.delivering = false;
          Step::Finish(completion)
        } else {
          state.delivering = false;
          Step::Idle
        }
      };

      match step {
        Step::Emit(value) => {
          let more = match self.subscriber.lock().as_mut() {
            Some(downstream) => downstream.receive(value),
            None => Demand::NONE,
          };
          self.state.lock().demand += more;
        }
        Step::Finish(completion) => {
          let downstream = self.subscriber.lock().take();
          if let Some(mut downstream) = downstream {
            downstream.receive_completion(completion);
          }
          return;
        }
        Step::Release => {
          let released = self.subscriber.lock().take();
          drop(released);
          return;
        }
        Step::Idle => return,
      }
    }
  }
}

impl<Item, Err> Subscription for Conduit<Item, Err>
where
  Item: Send,
  Err: Send,
{
  fn request(&self, demand: Demand) {
    let mut state = self.state.lock();
    if !state.cancelled && !state.terminated {
      state.demand += demand;
    }
  }

  fn cancel(&self) {
    let release = {
      let mut state = self.state.lock();
      if state.cancelled {
        return;
      }
      state.cancelled = true;
      !state.delivering
    };
    // Otherwise the delivering caller releases the subscriber once its
    // current callback returns.
    if release {
      let released = self.subscriber.lock().take();
      drop(released);
    }
  }
}
