//! Typed fail-open results.
//!
//! Listing, diff fetching, content fetching and model review never abort a
//! run: a failure is logged and the stage continues with a neutral value.
//! [`Fetched`] keeps the failure observable to callers and tests instead of
//! hiding it behind the log.

use crate::error::CriticError;

/// Outcome of a stage that degrades to a neutral value on failure.
///
/// # Examples
///
/// ```
/// use critic_core::{CriticError, Fetched};
///
/// let ok: Fetched<Vec<u32>> = Fetched::Value(vec![1, 2]);
/// assert_eq!(ok.into_value(), vec![1, 2]);
///
/// let failed: Fetched<Vec<u32>> = Fetched::Degraded(CriticError::GitHub("502".into()));
/// assert!(failed.is_degraded());
/// assert!(failed.into_value().is_empty());
/// ```
#[derive(Debug)]
pub enum Fetched<T> {
    /// The stage succeeded.
    Value(T),
    /// The stage failed; the error was logged and the caller should carry on.
    Degraded(CriticError),
}

impl<T> Fetched<T> {
    /// Wrap a result, logging the error at `warn` level when it failed.
    ///
    /// `what` names the stage in the log line, e.g. `"fetching changed files"`.
    pub fn from_result(result: Result<T, CriticError>, what: &str) -> Self {
        match result {
            Ok(value) => Fetched::Value(value),
            Err(e) => {
                tracing::warn!(error = %e, "error {what}");
                Fetched::Degraded(e)
            }
        }
    }

    /// `true` when the stage failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded(_))
    }

    /// The error, if the stage failed.
    pub fn error(&self) -> Option<&CriticError> {
        match self {
            Fetched::Value(_) => None,
            Fetched::Degraded(e) => Some(e),
        }
    }

    /// Borrow the value, if the stage succeeded.
    pub fn value(&self) -> Option<&T> {
        match self {
            Fetched::Value(v) => Some(v),
            Fetched::Degraded(_) => None,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// The value, or the neutral `T::default()` when degraded.
    pub fn into_value(self) -> T {
        match self {
            Fetched::Value(v) => v,
            Fetched::Degraded(_) => T::default(),
        }
    }
}
