//! Declaration-time registrar.
//!
//! Each service type runs through [`ServiceRegistry::declare`] exactly once
//! at load time. Every gate is hard: configuration conflicts, unknown
//! expose-to identifiers, and denied dependency edges all abort the
//! declaration before the instance is ever constructed, so an illegitimate
//! dependency fails at start-up rather than on first use.

use crate::error::{GateError, Result};
use crate::locate::{CallSite, ModuleId};
use crate::manifest;
use crate::policy::{self, Visibility};
use crate::registry::{ExposeList, ServiceDescriptor, ServiceRegistry};
use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

struct DepRef {
    type_id: TypeId,
    display_name: &'static str,
}

impl ServiceRegistry {
    /// Start declaring the service type `T`. The call site recorded here is
    /// the declaration site: it determines the owning module (unless
    /// overridden with [`ServiceBuilder::owned_by`]) and is reported on
    /// duplicate registration.
    #[track_caller]
    pub fn declare<T: Send + Sync + 'static>(&self) -> ServiceBuilder<'_, T> {
        ServiceBuilder {
            registry: self,
            site: CallSite::capture(),
            visibility: Visibility::default(),
            expose_to: ExposeList::new(),
            owned_by: None,
            deps: Vec::new(),
            _marker: PhantomData,
        }
    }
}

/// Collects the declaration options for one service, then runs the gates
/// and installs the singleton via [`ServiceBuilder::provide`] or
/// [`ServiceBuilder::provide_with`].
#[must_use = "a declaration does nothing until provide() or provide_with() runs"]
pub struct ServiceBuilder<'r, T> {
    registry: &'r ServiceRegistry,
    site: CallSite,
    visibility: Visibility,
    expose_to: ExposeList,
    owned_by: Option<ModuleId>,
    deps: Vec<DepRef>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ServiceBuilder<'_, T> {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Shorthand for `visibility(Visibility::Public)`.
    pub fn public(self) -> Self {
        self.visibility(Visibility::Public)
    }

    /// Grant access to the listed modules despite private visibility.
    /// Meaningless (and rejected) together with public visibility.
    pub fn expose_to<I, M>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ModuleId>,
    {
        self.expose_to.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Explicit owning module, overriding call-site inference. Intended for
    /// build steps that already know the file's module, and for tests.
    pub fn owned_by(mut self, module: impl Into<ModuleId>) -> Self {
        self.owned_by = Some(module.into());
        self
    }

    /// Pre-declare a constructor dependency. Each declared dependency that
    /// is a registered service gets policy-checked against this service's
    /// module before construction; identities that are not registered are
    /// skipped (not every constructor input is a service).
    pub fn depends_on<D: 'static>(mut self) -> Self {
        self.deps.push(DepRef {
            type_id: TypeId::of::<D>(),
            display_name: std::any::type_name::<D>(),
        });
        self
    }

    /// Install a dependency-free instance.
    pub fn provide(self, instance: T) -> Result<Arc<T>> {
        self.provide_with(move |_| Ok(instance))
    }

    /// Run all gates, construct the singleton through `init`, and insert it
    /// into the registry. Any failure aborts with no partial registration.
    pub fn provide_with(self, init: impl FnOnce(&Deps<'_>) -> Result<T>) -> Result<Arc<T>> {
        let name = std::any::type_name::<T>();

        // Gate 1: public visibility contradicts an explicit allow-list.
        if self.visibility == Visibility::Public && !self.expose_to.is_empty() {
            return Err(GateError::ConfigConflict {
                service: name,
                expose_to: self.expose_to.iter().map(ModuleId::to_string).collect(),
            });
        }

        // Gate 2: expose-to identifiers must exist in the known universe.
        // An absent universe cannot prove anything invalid; warn and go on.
        if !self.expose_to.is_empty() {
            match manifest::known_identifiers() {
                Some(universe) => {
                    let invalid = manifest::invalid_identifiers(self.expose_to.iter(), &universe);
                    if !invalid.is_empty() {
                        return Err(GateError::InvalidModuleRef {
                            service: name,
                            invalid,
                        });
                    }
                }
                None => tracing::warn!(
                    service = %name,
                    "no module manifests present; expose_to list left unvalidated"
                ),
            }
        }

        // Gate 3: owning module, derived once and immutable afterwards.
        let owning_module = self.owned_by.clone().or_else(|| self.site.module());

        // Gate 4: every registered dependency must pass the access policy
        // from this service's module before the object graph is built.
        for dep in &self.deps {
            if let Some(target) = self.registry.get_by_id(dep.type_id) {
                policy::authorize(name, owning_module.as_ref(), &target)?;
            } else {
                tracing::debug!(
                    service = %name,
                    dependency = %dep.display_name,
                    "declared dependency is not a registered service; skipping policy check"
                );
            }
        }

        // Gate 5: eager construction. Side effects in constructors happen
        // here, once, synchronously.
        let deps = Deps {
            registry: self.registry,
            consumer_name: name,
            consumer_module: owning_module.clone(),
        };
        let instance = Arc::new(init(&deps)?);

        // Gate 6: insert-once.
        self.registry.insert(ServiceDescriptor::new(
            Arc::clone(&instance),
            self.visibility,
            owning_module,
            self.expose_to,
            self.site,
        ))?;
        Ok(instance)
    }
}

/// Dependency access handed to the construction closure. Fetches re-run the
/// policy check from the declaring service's module, so a dependency that
/// skipped pre-declaration is still gated.
pub struct Deps<'r> {
    registry: &'r ServiceRegistry,
    consumer_name: &'static str,
    consumer_module: Option<ModuleId>,
}

impl Deps<'_> {
    pub fn get<D: Send + Sync + 'static>(&self) -> Result<Arc<D>> {
        let descriptor = self
            .registry
            .get::<D>()
            .ok_or(GateError::NotFound {
                type_name: std::any::type_name::<D>(),
            })?;
        policy::authorize(self.consumer_name, self.consumer_module.as_ref(), &descriptor)?;
        descriptor.instance_of::<D>()
    }
}
