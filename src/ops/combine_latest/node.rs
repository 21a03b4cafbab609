//! State machine shared by the sources of one combination.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{
  adapter::{Focus, SourceAdapter, SourceId},
  slots::{LatestSlot, LatestSlots},
};
use crate::{
  completion::Completion,
  demand::Demand,
  logging::{log_debug, log_trace, log_warn},
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionHandle},
};

/// How a source terminated. The failure payload goes to the pending
/// aggregate completion and is not kept here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminated {
  Finished,
  Failed,
}

struct NodeState<L, T, Err, const N: usize> {
  latest: L,
  completions: [Option<Terminated>; N],
  subscriptions: [Option<SubscriptionHandle>; N],
  /// Combined tuples not yet delivered, oldest first.
  pending: VecDeque<T>,
  /// The aggregate completion, from the moment the node turns terminal until
  /// it is delivered.
  completion: Option<Completion<Err>>,
  cancelled: bool,
  /// Set while one caller is delivering to the downstream.
  emitting: bool,
}

impl<L, T, Err, const N: usize> NodeState<L, T, Err, N> {
  /// A failure from any source, or a finish from every source.
  fn is_terminal(&self) -> bool {
    let mut all_finished = true;
    for completion in &self.completions {
      match completion {
        Some(Terminated::Failed) => return true,
        Some(Terminated::Finished) => {}
        None => all_finished = false,
      }
    }
    all_finished
  }

  fn is_closed(&self) -> bool { self.cancelled || self.is_terminal() }

  fn take_subscriptions(&mut self) -> SmallVec<[SubscriptionHandle; 4]> {
    self.subscriptions.iter_mut().filter_map(Option::take).collect()
  }

  /// Marks the caller as the one delivering. `false` when another caller
  /// already is; it picks up whatever was queued.
  fn begin_emitting(&mut self) -> bool { !std::mem::replace(&mut self.emitting, true) }
}

enum Step<T, Err> {
  Emit(T),
  Finish(Completion<Err>),
  Release,
  Idle,
}

/// The node every source adapter of one combination reports to, and the
/// subscription handed to the downstream.
///
/// Inbound signals only update `state` and queue what they produce. The
/// caller that finds nobody emitting drains the queue into the downstream,
/// so a source signalling from inside a downstream callback, or from another
/// thread, never waits on a delivery in progress. `state` is never held while
/// calling out of the node, and only the emitting caller locks `downstream`.
pub(crate) struct CombineLatestNode<L, Err, S, const N: usize>
where
  L: LatestSlots<N>,
{
  state: Mutex<NodeState<L, L::Output, Err, N>>,
  downstream: Mutex<Option<S>>,
}

impl<L, Err, S, const N: usize> CombineLatestNode<L, Err, S, N>
where
  L: LatestSlots<N> + 'static,
  Err: Send + 'static,
  S: Subscriber<L::Output, Err> + Send + 'static,
{
  /// Creates the node and hands it to `downstream` as its subscription.
  ///
  /// Sources are subscribed by the caller afterwards, so the downstream sees
  /// its subscription before any item.
  pub(crate) fn start(downstream: S) -> Arc<Self> {
    let node = Arc::new(CombineLatestNode {
      state: Mutex::new(NodeState {
        latest: L::default(),
        completions: [None; N],
        subscriptions: std::array::from_fn(|_| None),
        pending: VecDeque::new(),
        completion: None,
        cancelled: false,
        emitting: true,
      }),
      downstream: Mutex::new(Some(downstream)),
    });

    let handle: SubscriptionHandle = node.clone();
    if let Some(subscriber) = node.downstream.lock().as_mut() {
      subscriber.receive_subscription(handle);
    }
    // Emitting from the start keeps a cancel made inside
    // `receive_subscription` off the downstream lock; settle it now.
    node.drain();
    node
  }

  /// The subscriber to attach to source `I`.
  pub(crate) fn adapter<const I: usize>(self: &Arc<Self>) -> SourceAdapter<Focus<Self, I>> {
    SourceAdapter::new(Focus::new(self.clone()))
  }
}

impl<L, Err, S, const N: usize> CombineLatestNode<L, Err, S, N>
where
  L: LatestSlots<N>,
  Err: Send,
  S: Subscriber<L::Output, Err> + Send,
{
  /// Stores the handle of `source`.
  ///
  /// A handle arriving after cancellation or termination, or a second handle
  /// for the same source, is cancelled right away.
  pub(crate) fn attach_subscription(&self, source: SourceId, subscription: SubscriptionHandle) {
    let rejected = {
      let mut state = self.state.lock();
      if state.subscriptions[source.index()].is_some() {
        log_warn!("combine_latest: {} delivered a second subscription", source);
        true
      } else if state.is_closed() {
        true
      } else {
        state.subscriptions[source.index()] = Some(subscription.clone());
        false
      }
    };
    if rejected {
      log_trace!("combine_latest: cancelling late subscription of {}", source);
      subscription.cancel();
    }
  }

  /// Latches `item` as the latest value of source `I` and emits the combined
  /// tuple once every source has a value.
  pub(crate) fn attach_item<const I: usize>(&self, item: <L as LatestSlot<I>>::Item)
  where
    L: LatestSlot<I>,
  {
    {
      let mut state = self.state.lock();
      if state.is_closed() {
        log_trace!("combine_latest: dropped an item of {} after close", SourceId::new(I));
        return;
      }
      LatestSlot::<I>::latch(&mut state.latest, item);
      let Some(combined) = state.latest.snapshot() else { return };
      state.pending.push_back(combined);
      if !state.begin_emitting() {
        return;
      }
    }
    self.drain();
  }

  /// Records the completion of `source` and emits the aggregate completion
  /// when it makes the node terminal.
  ///
  /// A failure terminates at once and cancels the sources still running. A
  /// finish terminates only once every source finished. Tuples queued before
  /// the node turned terminal are still delivered ahead of the completion.
  pub(crate) fn attach_completion(&self, source: SourceId, completion: Completion<Err>) {
    let (orphaned, emit) = {
      let mut state = self.state.lock();
      if state.is_closed() {
        log_trace!("combine_latest: ignored completion of {} after close", source);
        return;
      }
      let index = source.index();
      state.subscriptions[index] = None;
      state.completions[index] =
        Some(if completion.is_failed() { Terminated::Failed } else { Terminated::Finished });
      if !state.is_terminal() {
        log_trace!("combine_latest: {} finished, waiting for the others", source);
        return;
      }

      log_debug!(
        "combine_latest: terminal after {} {}",
        source,
        if completion.is_failed() { "failed" } else { "finished" }
      );
      state.completion = Some(completion);
      (state.take_subscriptions(), state.begin_emitting())
    };

    if emit {
      self.drain();
    }
    for subscription in orphaned {
      subscription.cancel();
    }
  }

  /// Delivers queued tuples, then the aggregate completion, until nothing is
  /// left. Only called by the caller that set `emitting`.
  fn drain(&self) {
    loop {
      let step = {
        let mut state = self.state.lock();
        if state.cancelled {
          state.pending.clear();
          state.completion = None;
          state.emitting = false;
          Step::Release
        } else if let Some(combined) = state.pending.pop_front() {
          Step::Emit(combined)
        } else if let Some(completion) = state.completion.take() {
          state.emitting = false;
          Step::Finish(completion)
        } else {
          state.emitting = false;
          Step::Idle
        }
      };

      match step {
        Step::Emit(combined) => {
          let more = match self.downstream.lock().as_mut() {
            Some(subscriber) => subscriber.receive(combined),
            None => Demand::NONE,
          };
          if !more.is_none() {
            self.request(more);
          }
        }
        Step::Finish(completion) => {
          let downstream = self.downstream.lock().take();
          if let Some(mut subscriber) = downstream {
            subscriber.receive_completion(completion);
          }
          return;
        }
        Step::Release => {
          let released = self.downstream.lock().take();
          drop(released);
          return;
        }
        Step::Idle => return,
      }
    }
  }
}

impl<L, Err, S, const N: usize> Subscription for CombineLatestNode<L, Err, S, N>
where
  L: LatestSlots<N>,
  Err: Send,
  S: Send,
{
  /// Forwards `demand` unchanged to every source still running.
  ///
  /// Sources already receive unlimited demand from their adapters, so this
  /// never throttles them.
  fn request(&self, demand: Demand) {
    if demand.is_none() {
      log_warn!("combine_latest: ignored a request for zero items");
      return;
    }
    let subscriptions: SmallVec<[SubscriptionHandle; 4]> = {
      let state = self.state.lock();
      if state.cancelled {
        return;
      }
      state.subscriptions.iter().flatten().cloned().collect()
    };
    for subscription in subscriptions {
      subscription.request(demand);
    }
  }

  fn cancel(&self) {
    let (subscriptions, release) = {
      let mut state = self.state.lock();
      if state.cancelled {
        return;
      }
      state.cancelled = true;
      state.pending.clear();
      state.completion = None;
      (state.take_subscriptions(), !state.emitting)
    };
    log_debug!("combine_latest: cancelled, releasing {} sources", subscriptions.len());
    for subscription in subscriptions {
      subscription.cancel();
    }
    // Otherwise the emitting caller sees `cancelled` once its current
    // callback returns and releases the downstream itself.
    if release {
      let released = self.downstream.lock().take();
      drop(released);
    }
  }
}
