use crate::clients::{Error as ClientError, ResourceIdentity};
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

/// The `Error` type for [`Waiter::await_condition`](super::Waiter::await_condition). Errors
/// returned by the condition are passed through, preserving their type `E`.
#[derive(Debug)]
pub enum Error<E>
where
    E: Debug + Display + Send + Sync + 'static,
{
    /// The condition did not hold before the per-call timeout.
    Timeout(Expired),
    /// The suite budget ran out before the condition held or the per-call timeout elapsed.
    BudgetExceeded(Expired),
    /// The object store returned something other than an object or not-found.
    Fetch {
        identity: ResourceIdentity,
        source: ClientError,
    },
    /// The condition rejected the observed object. These are never retried.
    Condition {
        identity: ResourceIdentity,
        source: E,
    },
}

/// Diagnostics carried by the two deadline errors.
#[derive(Debug, Clone)]
pub struct Expired {
    pub identity: ResourceIdentity,
    /// What we were waiting for, e.g. 'to be Available'.
    pub description: String,
    pub elapsed: Duration,
    /// The last reason the condition gave for not being met, with the object's status.
    pub last_observed: String,
}

/// The `Result` type for the waiter.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

impl<E> Error<E>
where
    E: Debug + Display + Send + Sync + 'static,
{
    pub fn identity(&self) -> &ResourceIdentity {
        match self {
            Error::Timeout(expired) | Error::BudgetExceeded(expired) => &expired.identity,
            Error::Fetch { identity, .. } | Error::Condition { identity, .. } => identity,
        }
    }

    /// Converts the condition error type, leaving the other variants unchanged.
    pub fn map_condition<F, E2>(self, f: F) -> Error<E2>
    where
        F: FnOnce(E) -> E2,
        E2: Debug + Display + Send + Sync + 'static,
    {
        match self {
            Error::Timeout(expired) => Error::Timeout(expired),
            Error::BudgetExceeded(expired) => Error::BudgetExceeded(expired),
            Error::Fetch { identity, source } => Error::Fetch { identity, source },
            Error::Condition { identity, source } => Error::Condition {
                identity,
                source: f(source),
            },
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Timeout(_) | Error::BudgetExceeded(_) => None,
            Error::Fetch { source, .. } => Some(source),
            Error::Condition { source, .. } => Some(source),
        }
    }
}

impl<E> Display for Error<E>
where
    E: Debug + Display + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Timeout(e) => write!(
                f,
                "Timed out after {:?} waiting for {} {}, last observed: {}",
                e.elapsed, e.identity, e.description, e.last_observed
            ),
            Error::BudgetExceeded(e) => write!(
                f,
                "Exceeded overall budget after {:?} waiting for {} {}, last observed: {}",
                e.elapsed, e.identity, e.description, e.last_observed
            ),
            Error::Fetch { identity, source } => {
                write!(f, "Unable to fetch {}: {}", identity, source)
            }
            Error::Condition { identity, source } => {
                write!(f, "Condition failed for {}: {}", identity, source)
            }
        }
    }
}
