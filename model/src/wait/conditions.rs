/*!

Ready-made [`Condition`]s for the objects the suite waits on. A condition decides, for one fresh
snapshot (or its absence), whether the wait is over, still pending, or has failed.

!*/

use crate::condition::{ConditionStatus, HasConditions};
use std::convert::Infallible;
use std::marker::PhantomData;

/// The outcome of evaluating a condition against one snapshot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict {
    /// The condition holds.
    Done,
    /// Not converged yet. The reason is kept for diagnostics if the wait times out.
    Pending(String),
}

impl Verdict {
    pub fn pending<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Verdict::Pending(reason.into())
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Verdict::Done)
    }
}

impl From<bool> for Verdict {
    fn from(done: bool) -> Self {
        if done {
            Verdict::Done
        } else {
            Verdict::pending("condition not met")
        }
    }
}

/// A predicate over the observed state of an object of kind `K`. `None` means the object does not
/// exist. Returning an error ends the wait immediately.
pub trait Condition<K> {
    type Error;

    fn check(&self, object: Option<&K>) -> Result<Verdict, Self::Error>;
}

/// A [`Condition`] built from a closure, see [`from_fn`].
pub struct FromFn<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<K, E, F> Condition<K> for FromFn<F, E>
where
    F: Fn(Option<&K>) -> Result<Verdict, E>,
{
    type Error = E;

    fn check(&self, object: Option<&K>) -> Result<Verdict, E> {
        (self.f)(object)
    }
}

/// Creates a condition that sees the snapshot, including its absence.
pub fn from_fn<K, E, F>(f: F) -> FromFn<F, E>
where
    F: Fn(Option<&K>) -> Result<Verdict, E>,
{
    FromFn {
        f,
        _error: PhantomData,
    }
}

/// Creates a condition that treats a missing object as not converged and only calls `f` once the
/// object exists.
pub fn when_present<K, E, F>(f: F) -> FromFn<impl Fn(Option<&K>) -> Result<Verdict, E>, E>
where
    F: Fn(&K) -> Result<Verdict, E>,
{
    from_fn(move |object: Option<&K>| match object {
        Some(object) => f(object),
        None => Ok(Verdict::pending("object not found")),
    })
}

/// The object exists.
pub fn exists<K>() -> impl Condition<K, Error = Infallible> {
    when_present(|_: &K| Ok::<_, Infallible>(Verdict::Done))
}

/// The object does not exist.
pub fn is_deleted<K>() -> impl Condition<K, Error = Infallible> {
    from_fn(|object: Option<&K>| {
        Ok::<_, Infallible>(match object {
            None => Verdict::Done,
            Some(_) => Verdict::pending("object still exists"),
        })
    })
}

/// The object has a condition of type `type_` with status `True`.
pub fn is_condition_true<'a, K>(type_: &'a str) -> impl Condition<K, Error = Infallible> + 'a
where
    K: HasConditions + 'a,
{
    has_condition(type_, ConditionStatus::True, None)
}

/// The object has a condition of type `type_` with the given `status`, and with the given
/// `reason` if one is provided.
pub fn has_condition<'a, K>(
    type_: &'a str,
    status: ConditionStatus,
    reason: Option<&'a str>,
) -> impl Condition<K, Error = Infallible> + 'a
where
    K: HasConditions + 'a,
{
    when_present(move |object: &K| {
        let found = match object.find_condition(type_) {
            None => {
                return Ok::<_, Infallible>(Verdict::pending(format!(
                    "no '{}' condition",
                    type_
                )))
            }
            Some(found) => found,
        };
        let reason_matches = reason.map(|r| r == found.reason).unwrap_or(true);
        Ok(if found.status == status && reason_matches {
            Verdict::Done
        } else {
            Verdict::pending(format!(
                "'{}' is {}({})",
                found.type_, found.status, found.reason
            ))
        })
    })
}
