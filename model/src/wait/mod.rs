/*!

The condition poller. A [`Waiter`] repeatedly re-reads one object through an [`ObjectClient`] and
evaluates a [`Condition`] against each fresh snapshot until the condition holds, the per-call
timeout elapses, or the suite budget runs out.

!*/

mod conditions;
mod error;

pub use conditions::{
    exists, from_fn, has_condition, is_condition_true, is_deleted, when_present, Condition, FromFn,
    Verdict,
};
pub use error::{Error, Expired, Result};

use crate::clients::{ObjectClient, Observable, ResourceIdentity};
use crate::constants::{
    DEFAULT_AVAILABILITY_TIMEOUT, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
use log::{debug, trace};
use std::fmt::{Debug, Display};
use std::time::Duration;
use tokio::time::Instant;

/// Poll cadence and the default per-call timeout.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_AVAILABILITY_TIMEOUT,
        }
    }
}

impl PollSettings {
    /// The time between fetches, never less than [`MIN_POLL_INTERVAL`].
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

/// An absolute deadline shared by every wait in a suite run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SuiteBudget {
    deadline: Instant,
}

impl SuiteBudget {
    pub fn starting_now(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_exhausted(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Polls objects through a borrowed [`ObjectClient`]. The waiter never mutates the store.
#[derive(Debug)]
pub struct Waiter<'a, C> {
    client: &'a C,
    settings: PollSettings,
    budget: Option<SuiteBudget>,
}

// Manual impls so that `C` does not need to be `Clone`.
impl<C> Clone for Waiter<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Waiter<'_, C> {}

impl<'a, C> Waiter<'a, C>
where
    C: ObjectClient,
{
    pub fn new(client: &'a C, settings: PollSettings) -> Self {
        Self {
            client,
            settings,
            budget: None,
        }
    }

    /// Bounds every wait by `budget` in addition to its own timeout.
    pub fn with_budget(mut self, budget: SuiteBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn client(&self) -> &'a C {
        self.client
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Waits for `condition` to hold for the object at `identity` using the default timeout.
    pub async fn await_default<K, P>(
        &self,
        identity: &ResourceIdentity,
        description: &str,
        condition: P,
    ) -> Result<Option<K>, P::Error>
    where
        K: Observable,
        P: Condition<K>,
        P::Error: Debug + Display + Send + Sync + 'static,
    {
        self.await_condition(identity, description, self.settings.timeout, condition)
            .await
    }

    /// Fetches the object at `identity` every poll interval and evaluates `condition` against the
    /// snapshot. Returns the snapshot that satisfied the condition, which is `None` when the
    /// condition was satisfied by the object's absence.
    ///
    /// The wait fails with [`Error::Timeout`] once `timeout` has elapsed, or with
    /// [`Error::BudgetExceeded`] if the suite budget ends first. Fetch failures and condition
    /// errors end the wait immediately.
    pub async fn await_condition<K, P>(
        &self,
        identity: &ResourceIdentity,
        description: &str,
        timeout: Duration,
        condition: P,
    ) -> Result<Option<K>, P::Error>
    where
        K: Observable,
        P: Condition<K>,
        P::Error: Debug + Display + Send + Sync + 'static,
    {
        let start = Instant::now();
        let call_deadline = start + timeout;
        let (deadline, budget_bound) = match self.budget {
            Some(budget) if budget.deadline() < call_deadline => (budget.deadline(), true),
            _ => (call_deadline, false),
        };
        debug!(
            "Waiting up to {:?} for {} {}",
            deadline.saturating_duration_since(start),
            identity,
            description
        );

        let expired = |last_observed: String| {
            let expired = Expired {
                identity: identity.clone(),
                description: description.to_string(),
                elapsed: Instant::now().saturating_duration_since(start),
                last_observed,
            };
            if budget_bound {
                Error::BudgetExceeded(expired)
            } else {
                Error::Timeout(expired)
            }
        };

        let mut last_observed = String::from("nothing");
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let fetched = match tokio::time::timeout_at(deadline, self.client.fetch::<K>(identity))
                .await
            {
                Ok(result) => result.map_err(|source| Error::Fetch {
                    identity: identity.clone(),
                    source,
                })?,
                Err(_) => return Err(expired(last_observed)),
            };

            let verdict = condition
                .check(fetched.as_ref())
                .map_err(|source| Error::Condition {
                    identity: identity.clone(),
                    source,
                })?;
            match verdict {
                Verdict::Done => {
                    debug!(
                        "{} {} after {} attempts",
                        identity,
                        description,
                        attempt
                    );
                    return Ok(fetched);
                }
                Verdict::Pending(reason) => {
                    last_observed = match &fetched {
                        Some(object) => format!("{} [{}]", reason, object.status_summary()),
                        None => reason,
                    };
                    trace!(
                        "Attempt {} for {}: {}",
                        attempt,
                        identity,
                        last_observed
                    );
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(expired(last_observed));
            }
            let next = now + self.settings.effective_interval();
            tokio::time::sleep_until(std::cmp::min(next, deadline)).await;
        }
    }
}
