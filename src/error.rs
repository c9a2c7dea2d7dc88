//! Error taxonomy for declaration and resolution.
//!
//! Every variant is raised synchronously during single-threaded start-up (or
//! from a resolve call) and is meant to abort the process: a mis-declared
//! service is a programming error, not a recoverable runtime condition.

use crate::policy::Denial;
use std::panic::Location;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Declared `public` together with a non-empty expose-to list. The two
    /// are contradictory: a public service needs no allow-list.
    #[error(
        "service `{service}` declares visibility \"public\" together with expose_to {expose_to:?}; \
         a public service is reachable from every module, drop the expose_to list or make it private"
    )]
    ConfigConflict {
        service: &'static str,
        expose_to: Vec<String>,
    },

    /// Expose-to names identifiers outside the known module universe.
    /// Only the invalid subset is reported.
    #[error("service `{service}` exposes itself to unknown module identifiers {invalid:?}")]
    InvalidModuleRef {
        service: &'static str,
        invalid: Vec<String>,
    },

    /// The access policy denied a dependency edge or a manual resolve.
    #[error("{0}")]
    AccessDenied(Box<Denial>),

    /// The requested type was never declared. Distinct from a denial: the
    /// class was never registered at all.
    #[error("service `{type_name}` was never declared; declare it before resolving it")]
    NotFound { type_name: &'static str },

    /// Registry held a value of an unexpected type for this key. Cannot
    /// happen through the public API (entries are keyed by `TypeId`), kept
    /// as a guard on the downcast path.
    #[error("registry entry for `{type_name}` holds a value of a different type")]
    TypeMismatch { type_name: &'static str },

    /// Same identity declared twice. Both declaration sites are reported so
    /// the copy-pasted one can be found without searching.
    #[error(
        "service `{type_name}` declared twice: first at {first}, again at {second}; \
         each service registers exactly once per process"
    )]
    Duplicate {
        type_name: &'static str,
        first: &'static Location<'static>,
        second: &'static Location<'static>,
    },
}

impl From<Denial> for GateError {
    fn from(denial: Denial) -> Self {
        GateError::AccessDenied(Box::new(denial))
    }
}

pub type Result<T = ()> = std::result::Result<T, GateError>;
