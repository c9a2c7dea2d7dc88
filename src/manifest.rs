//! Statically known universe of module identifiers.
//!
//! An external codegen step (or each module's own source) submits one
//! [`ModuleManifest`] per module or provider via [`module_manifest!`] /
//! [`provider_manifest!`]; `inventory` collects them at link time. The
//! declaration-time registrar checks expose-to lists against this universe.
//!
//! The universe may legitimately be absent (nothing submitted yet, e.g. the
//! module list has not been generated). Callers treat that as "cannot prove
//! invalid" and degrade validation to a warning rather than failing.

use crate::locate::{ModuleId, PROVIDER_PREFIX};
use std::collections::BTreeSet;

/// One known module or provider, submitted at link time.
pub struct ModuleManifest {
    pub name: &'static str,
    pub kind: ManifestKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ManifestKind {
    Module,
    Provider,
}

inventory::collect!(ModuleManifest);

/// Declare a known module identifier, e.g. `module_manifest!("orders");`.
#[macro_export]
macro_rules! module_manifest {
    ($name:literal) => {
        $crate::inventory::submit! {
            $crate::manifest::ModuleManifest {
                name: $name,
                kind: $crate::manifest::ManifestKind::Module,
            }
        }
    };
}

/// Declare a known provider identifier, e.g. `provider_manifest!("stripe");`
/// (addressable as `provider:stripe`).
#[macro_export]
macro_rules! provider_manifest {
    ($name:literal) => {
        $crate::inventory::submit! {
            $crate::manifest::ModuleManifest {
                name: $name,
                kind: $crate::manifest::ManifestKind::Provider,
            }
        }
    };
}

/// Full set of valid identifiers in textual form (`"orders"`,
/// `"provider:stripe"`), or `None` when no manifest was ever submitted.
pub fn known_identifiers() -> Option<BTreeSet<String>> {
    let mut universe = BTreeSet::new();
    let mut any = false;
    for manifest in inventory::iter::<ModuleManifest> {
        any = true;
        let ident = match manifest.kind {
            ManifestKind::Module => manifest.name.to_owned(),
            ManifestKind::Provider => format!("{PROVIDER_PREFIX}{}", manifest.name),
        };
        universe.insert(ident);
    }
    any.then_some(universe)
}

/// Order-preserving subset of `candidates` not present in `universe`.
pub fn invalid_identifiers<'a, I>(candidates: I, universe: &BTreeSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = &'a ModuleId>,
{
    candidates
        .into_iter()
        .filter(|id| !universe.contains(&id.to_string()))
        .map(|id| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_subset_preserves_candidate_order() {
        let universe: BTreeSet<String> =
            ["orders", "users", "provider:stripe"].iter().map(|s| (*s).to_owned()).collect();
        let candidates = [
            ModuleId::parse("billing"),
            ModuleId::parse("users"),
            ModuleId::parse("provider:redis"),
            ModuleId::parse("orders"),
        ];
        let invalid = invalid_identifiers(&candidates, &universe);
        assert_eq!(invalid, vec!["billing".to_owned(), "provider:redis".to_owned()]);
    }

    #[test]
    fn empty_candidates_are_trivially_valid() {
        let universe: BTreeSet<String> = ["orders".to_owned()].into_iter().collect();
        assert!(invalid_identifiers(std::iter::empty::<&ModuleId>(), &universe).is_empty());
    }

    #[test]
    fn provider_candidates_match_only_namespaced_entries() {
        let universe: BTreeSet<String> = ["stripe".to_owned()].into_iter().collect();
        let candidates = [ModuleId::parse("provider:stripe")];
        // A provider identity never matches a plain module entry of the same name.
        assert_eq!(invalid_identifiers(&candidates, &universe), vec!["provider:stripe".to_owned()]);
    }
}
