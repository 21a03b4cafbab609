// Conditional logging shim: forwards to `tracing` when the feature is on and
// expands to nothing otherwise. The `log_` prefix keeps the names clear of the
// built-in `warn` attribute.

#[cfg(feature = "tracing")]
macro_rules! log_trace {
  ($($arg:tt)*) => {
    tracing::trace!($($arg)*)
  };
}

#[cfg(feature = "tracing")]
macro_rules! log_debug {
  ($($arg:tt)*) => {
    tracing::debug!($($arg)*)
  };
}

#[cfg(feature = "tracing")]
macro_rules! log_warn {
  ($($arg:tt)*) => {
    tracing::warn!($($arg)*)
  };
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_trace {
  ($($arg:tt)*) => {{
    if false {
      let _ = format_args!($($arg)*);
    }
  }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_debug {
  ($($arg:tt)*) => {{
    if false {
      let _ = format_args!($($arg)*);
    }
  }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_warn {
  ($($arg:tt)*) => {{
    if false {
      let _ = format_args!($($arg)*);
    }
  }};
}

pub(crate) use {log_debug, log_trace, log_warn};
