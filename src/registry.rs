//! Process-wide service registry: one descriptor per distinct service type.
//!
//! All mutation happens during single-threaded start-up; afterwards the
//! registry is effectively read-only. Insertion is still an atomic
//! insert-if-absent under a write lock, so under concurrent module loading
//! exactly one registration wins and the rest fail with a duplicate error.

use crate::error::{GateError, Result};
use crate::locate::{CallSite, ModuleId};
use crate::policy::Visibility;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Expose-to lists are short; keep them inline.
pub(crate) type ExposeList = SmallVec<[ModuleId; 4]>;

/// Stored metadata plus the eagerly constructed singleton of one service.
///
/// Immutable after insertion; the registry exclusively owns the singleton
/// for the lifetime of the process.
pub struct ServiceDescriptor {
    type_id: TypeId,
    display_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
    visibility: Visibility,
    owning_module: Option<ModuleId>,
    expose_to: ExposeList,
    declared_at: CallSite,
}

impl ServiceDescriptor {
    pub(crate) fn new<T: Send + Sync + 'static>(
        instance: Arc<T>,
        visibility: Visibility,
        owning_module: Option<ModuleId>,
        expose_to: ExposeList,
        declared_at: CallSite,
    ) -> Self {
        ServiceDescriptor {
            type_id: TypeId::of::<T>(),
            display_name: std::any::type_name::<T>(),
            instance,
            visibility,
            owning_module,
            expose_to,
            declared_at,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable type name, for diagnostics only.
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// `None` means ambient: infrastructure with no module home.
    pub fn owning_module(&self) -> Option<&ModuleId> {
        self.owning_module.as_ref()
    }

    pub fn expose_to(&self) -> &[ModuleId] {
        &self.expose_to
    }

    pub fn declared_at(&self) -> CallSite {
        self.declared_at
    }

    /// Whether `module` is on the explicit allow-list.
    pub fn allows(&self, module: &ModuleId) -> bool {
        self.expose_to.contains(module)
    }

    /// Typed view of the singleton.
    pub(crate) fn instance_of<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.instance
            .clone()
            .downcast::<T>()
            .map_err(|_| GateError::TypeMismatch {
                type_name: self.display_name,
            })
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.display_name)
            .field("visibility", &self.visibility)
            .field("owning_module", &self.owning_module)
            .field("expose_to", &self.expose_to)
            .field("declared_at", &self.declared_at)
            .finish_non_exhaustive()
    }
}

/// Mapping from service type identity to its descriptor. Insert-once.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Arc<ServiceDescriptor>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-if-absent. A second declaration of the same identity fails
    /// with both declaration sites in the error.
    pub(crate) fn insert(&self, descriptor: ServiceDescriptor) -> Result<Arc<ServiceDescriptor>> {
        let mut services = self.services.write();
        match services.entry(descriptor.type_id) {
            Entry::Occupied(existing) => Err(GateError::Duplicate {
                type_name: descriptor.display_name,
                first: existing.get().declared_at.location(),
                second: descriptor.declared_at.location(),
            }),
            Entry::Vacant(slot) => {
                let descriptor = Arc::new(descriptor);
                slot.insert(Arc::clone(&descriptor));
                Ok(descriptor)
            }
        }
    }

    pub fn get<T: 'static>(&self) -> Option<Arc<ServiceDescriptor>> {
        self.get_by_id(TypeId::of::<T>())
    }

    pub(crate) fn get_by_id(&self, id: TypeId) -> Option<Arc<ServiceDescriptor>> {
        self.services.read().get(&id).cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.services.read().contains_key(&TypeId::of::<T>())
    }

    /// All descriptors, ordered by display name for deterministic reports.
    pub fn snapshot(&self) -> Vec<Arc<ServiceDescriptor>> {
        let mut all: Vec<_> = self.services.read().values().cloned().collect();
        all.sort_by_key(|d| d.display_name());
        all
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Drop every registration. Test isolation only; production code never
    /// removes a service.
    pub fn clear(&self) {
        self.services.write().clear();
    }
}
