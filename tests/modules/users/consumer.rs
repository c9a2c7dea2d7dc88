//! Consumers living under `modules/users/`; resolves and declarations made
//! here run with the inferred consumer module `users`.

use crate::orders::{OrdersLedger, SharedRates};
use std::sync::Arc;
use svcgate::prelude::*;

pub fn resolve_ledger(registry: &ServiceRegistry) -> Result<Arc<OrdersLedger>> {
    registry.resolve::<OrdersLedger>()
}

pub fn resolve_rates(registry: &ServiceRegistry) -> Result<Arc<SharedRates>> {
    registry.resolve::<SharedRates>()
}

#[derive(Debug)]
pub struct UsersDirectory {
    pub seeded_from: u32,
}

/// Declares a constructor dependency on the private `orders` ledger; the
/// declaration must fail before `UsersDirectory` is ever constructed.
pub fn declare_directory_on_ledger(registry: &ServiceRegistry) -> Result<Arc<UsersDirectory>> {
    registry
        .declare::<UsersDirectory>()
        .depends_on::<OrdersLedger>()
        .provide_with(|deps| {
            Ok(UsersDirectory {
                seeded_from: deps.get::<OrdersLedger>()?.entries,
            })
        })
}

/// Depends on the rates service that `orders` exposes to `users`.
pub fn declare_directory_on_rates(registry: &ServiceRegistry) -> Result<Arc<UsersDirectory>> {
    registry
        .declare::<UsersDirectory>()
        .depends_on::<SharedRates>()
        .provide_with(|deps| {
            Ok(UsersDirectory {
                seeded_from: deps.get::<SharedRates>()?.basis_points,
            })
        })
}
