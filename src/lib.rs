//! Module-scoped singleton service registry with capability-based
//! visibility.
//!
//! Services register once, at load time, into a process-wide registry. Each
//! service belongs to the module its declaration site lives in (a
//! `modules/<name>/` or `providers/<name>/` path segment), is `private` by
//! default, and may widen access either to everyone (`public`) or to an
//! explicit list of modules (`expose_to`). The policy is enforced twice:
//! when a service declares its constructor dependencies, before the
//! instance is built, and again on every later [`resolve`] call.
//!
//! ```no_run
//! use svcgate::prelude::*;
//!
//! struct AuditLog;
//!
//! // Usually invoked from within modules/<name>/ so ownership is inferred;
//! // owned_by() pins it explicitly.
//! let registry = ServiceRegistry::new();
//! let _ = registry
//!     .declare::<AuditLog>()
//!     .owned_by("orders")
//!     .expose_to(["billing"])
//!     .provide(AuditLog)?;
//!
//! let log = registry.resolve_from::<AuditLog>("billing.handler", Some(&ModuleId::parse("billing")))?;
//! # Ok::<(), GateError>(())
//! ```
//!
//! The crate-level [`declare`], [`resolve`] and [`resolve_many`] functions
//! operate on one process-wide default registry; explicitly constructed
//! [`ServiceRegistry`] values exist for tests and embedders.

pub mod declare;
pub mod error;
pub mod locate;
pub mod manifest;
pub mod policy;
pub mod registry;
pub mod report;
pub mod resolve;

// Re-exported for the manifest submission macros.
pub use inventory;

pub mod prelude {
    pub use crate::declare::{Deps, ServiceBuilder};
    pub use crate::error::{GateError, Result};
    pub use crate::locate::ModuleId;
    pub use crate::policy::Visibility;
    pub use crate::registry::{ServiceDescriptor, ServiceRegistry};
    pub use crate::resolve::ResolveSet;
}

use crate::declare::ServiceBuilder;
use crate::error::Result;
use crate::registry::ServiceRegistry;
use crate::resolve::ResolveSet;
use std::sync::Arc;
use std::sync::OnceLock;

static DEFAULT_REGISTRY: OnceLock<ServiceRegistry> = OnceLock::new();

/// The process-wide default registry.
pub fn global() -> &'static ServiceRegistry {
    DEFAULT_REGISTRY.get_or_init(ServiceRegistry::new)
}

/// Declare a service on the default registry. See
/// [`ServiceRegistry::declare`].
#[track_caller]
pub fn declare<T: Send + Sync + 'static>() -> ServiceBuilder<'static, T> {
    global().declare()
}

/// Resolve a singleton from the default registry, gated on the module
/// inferred from this call site. See [`ServiceRegistry::resolve`].
#[track_caller]
pub fn resolve<T: Send + Sync + 'static>() -> Result<Arc<T>> {
    global().resolve()
}

/// Batch resolve from the default registry: all-or-nothing. See
/// [`ServiceRegistry::resolve_many`].
#[track_caller]
pub fn resolve_many<S: ResolveSet>() -> Result<S::Output> {
    global().resolve_many::<S>()
}

/// Start-up report over the default registry.
pub fn startup_report() -> report::StartupReport {
    report::StartupReport::collect(global())
}
