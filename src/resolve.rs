//! Consumption-time accessor.
//!
//! The read path after start-up: route handlers and other infrastructure
//! fetch already-registered singletons by type. The caller's module is
//! inferred from the resolve call site, not from the declaration site, and
//! the access policy runs on every fetch. Resolution either succeeds or
//! fails with a diagnostic; it never hands back a partial result.

use crate::error::{GateError, Result};
use crate::locate::{CallSite, ModuleId};
use crate::policy;
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use std::sync::Arc;

impl ServiceRegistry {
    /// Fetch the singleton of `T`, gating on the module inferred from this
    /// call site.
    #[track_caller]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let site = CallSite::capture();
        self.resolve_from(site.file(), site.module().as_ref())
    }

    /// Fetch with an explicit consumer identity. For framework glue whose
    /// location carries no module, and for tests.
    pub fn resolve_from<T: Send + Sync + 'static>(
        &self,
        consumer_name: &str,
        consumer: Option<&ModuleId>,
    ) -> Result<Arc<T>> {
        let descriptor = self.lookup::<T>()?;
        policy::authorize(consumer_name, consumer, &descriptor)?;
        descriptor.instance_of::<T>()
    }

    /// Batch fetch: `resolve_many::<(A, B, C)>()`. Every member is looked up
    /// and authorized before any instance is returned, so a handler that
    /// needs three services never silently proceeds with two.
    #[track_caller]
    pub fn resolve_many<S: ResolveSet>(&self) -> Result<S::Output> {
        let site = CallSite::capture();
        S::resolve_set_from(self, site.file(), site.module().as_ref())
    }

    /// Batch form of [`ServiceRegistry::resolve_from`].
    pub fn resolve_many_from<S: ResolveSet>(
        &self,
        consumer_name: &str,
        consumer: Option<&ModuleId>,
    ) -> Result<S::Output> {
        S::resolve_set_from(self, consumer_name, consumer)
    }

    fn lookup<T: 'static>(&self) -> Result<Arc<ServiceDescriptor>> {
        self.get::<T>().ok_or(GateError::NotFound {
            type_name: std::any::type_name::<T>(),
        })
    }
}

/// Tuples of service types resolvable as one all-or-nothing batch.
pub trait ResolveSet {
    type Output;

    fn resolve_set_from(
        registry: &ServiceRegistry,
        consumer_name: &str,
        consumer: Option<&ModuleId>,
    ) -> Result<Self::Output>;
}

macro_rules! impl_resolve_set {
    ($($ty:ident),+) => {
        impl<$($ty: Send + Sync + 'static),+> ResolveSet for ($($ty,)+) {
            type Output = ($(Arc<$ty>,)+);

            #[allow(non_snake_case)]
            fn resolve_set_from(
                registry: &ServiceRegistry,
                consumer_name: &str,
                consumer: Option<&ModuleId>,
            ) -> Result<Self::Output> {
                // Look up and authorize the whole set before touching any
                // instance; partial success is not exposed.
                $(let $ty = registry.lookup::<$ty>()?;)+
                $(policy::authorize(consumer_name, consumer, &$ty)?;)+
                Ok(($($ty.instance_of::<$ty>()?,)+))
            }
        }
    };
}

impl_resolve_set!(A);
impl_resolve_set!(A, B);
impl_resolve_set!(A, B, C);
impl_resolve_set!(A, B, C, D);
impl_resolve_set!(A, B, C, D, E);
impl_resolve_set!(A, B, C, D, E, F);
impl_resolve_set!(A, B, C, D, E, F, G);
impl_resolve_set!(A, B, C, D, E, F, G, H);
