//! Terminal signal of a publisher.

/// The last signal a publisher sends to a subscriber.
///
/// A publisher sends at most one completion and nothing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion<Err> {
  /// The publisher finished normally.
  Finished,
  /// The publisher stopped because of an error.
  Failed(Err),
}

impl<Err> Completion<Err> {
  #[inline]
  pub fn is_finished(&self) -> bool { matches!(self, Completion::Finished) }

  #[inline]
  pub fn is_failed(&self) -> bool { matches!(self, Completion::Failed(_)) }

  /// Converts from `&Completion<Err>` to `Completion<&Err>`.
  #[inline]
  pub fn as_ref(&self) -> Completion<&Err> {
    match self {
      Completion::Finished => Completion::Finished,
      Completion::Failed(err) => Completion::Failed(err),
    }
  }

  /// Maps the failure payload, leaving `Finished` untouched.
  pub fn map_failure<F, E2>(self, f: F) -> Completion<E2>
  where
    F: FnOnce(Err) -> E2,
  {
    match self {
      Completion::Finished => Completion::Finished,
      Completion::Failed(err) => Completion::Failed(f(err)),
    }
  }

  /// The failure payload, if any.
  pub fn failure(self) -> Option<Err> {
    match self {
      Completion::Finished => None,
      Completion::Failed(err) => Some(err),
    }
  }

  /// `Ok(())` for `Finished`, `Err(err)` for `Failed(err)`.
  pub fn into_result(self) -> Result<(), Err> {
    match self {
      Completion::Finished => Ok(()),
      Completion::Failed(err) => Err(err),
    }
  }
}

impl<Err> From<Result<(), Err>> for Completion<Err> {
  fn from(result: Result<(), Err>) -> Self {
    match result {
      Ok(()) => Completion::Finished,
      Err(err) => Completion::Failed(err),
    }
  }
}
