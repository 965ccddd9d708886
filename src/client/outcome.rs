//! Live vs demo results

use super::error::{ApiError, ApiResult};

/// Data from a fallback-capable call, labeled with where it came from
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Returned by the backend
    Live(T),
    /// Canned demo data substituted after a failure
    Demo(T),
}

impl<T> Outcome<T> {
    pub fn is_demo(&self) -> bool {
        matches!(self, Outcome::Demo(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Outcome::Live(v) | Outcome::Demo(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Live(v) | Outcome::Demo(v) => v,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Live(v) => Outcome::Live(f(v)),
            Outcome::Demo(v) => Outcome::Demo(f(v)),
        }
    }

    /// Live data only; demo data becomes `None`
    pub fn live(self) -> Option<T> {
        match self {
            Outcome::Live(v) => Some(v),
            Outcome::Demo(_) => None,
        }
    }
}

/// Resolve a call result under the demo-mode policy
pub(crate) fn resolve<T, F>(
    operation: &str,
    demo_mode: bool,
    result: ApiResult<T>,
    demo: F,
) -> ApiResult<Outcome<T>>
where
    F: FnOnce() -> T,
{
    match result {
        Ok(value) => Ok(Outcome::Live(value)),
        Err(e) if demo_mode && e.is_fallback_eligible() => {
            tracing::warn!(
                operation,
                error = %e,
                "Backend call failed; serving demo data"
            );
            Ok(Outcome::Demo(demo()))
        }
        Err(e) => Err(e),
    }
}
