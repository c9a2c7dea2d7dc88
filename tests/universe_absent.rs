//! Behavior when no module manifests were ever submitted: the identifier
//! universe is unavailable, so allow-list validation cannot prove anything
//! invalid and degrades to a warning. This binary deliberately submits no
//! manifests.

use svcgate::locate::ModuleId;
use svcgate::manifest::known_identifiers;
use svcgate::prelude::*;

#[derive(Debug)]
struct Rates;

#[test]
fn missing_universe_degrades_allow_list_validation_to_a_warning() {
    assert!(known_identifiers().is_none(), "this binary must not submit manifests");

    let registry = ServiceRegistry::new();
    registry
        .declare::<Rates>()
        .owned_by("orders")
        .expose_to(["users", "made-up-module"])
        .provide(Rates)
        .expect("unvalidated allow-list is a warning, not a failure");

    // The unvalidated list is still enforced as written.
    registry
        .resolve_from::<Rates>("users.handler", Some(&ModuleId::parse("users")))
        .expect("listed module is allowed");
    registry
        .resolve_from::<Rates>("billing.handler", Some(&ModuleId::parse("billing")))
        .expect_err("unlisted module is still denied");
}
