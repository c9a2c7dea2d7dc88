//! Declarations living under `modules/orders/`; the registrar infers the
//! owning module `orders` from this file's path.

use std::sync::Arc;
use svcgate::prelude::*;

#[derive(Debug)]
pub struct OrdersLedger {
    pub entries: u32,
}

/// Private to `orders`, exposed to nobody.
pub fn declare_ledger(registry: &ServiceRegistry) -> Result<Arc<OrdersLedger>> {
    registry.declare::<OrdersLedger>().provide(OrdersLedger { entries: 3 })
}

pub struct SharedRates {
    pub basis_points: u32,
}

/// Private to `orders`, explicitly exposed to `users`.
pub fn declare_rates(registry: &ServiceRegistry) -> Result<Arc<SharedRates>> {
    registry
        .declare::<SharedRates>()
        .expose_to(["users"])
        .provide(SharedRates { basis_points: 125 })
}

pub fn resolve_ledger(registry: &ServiceRegistry) -> Result<Arc<OrdersLedger>> {
    registry.resolve::<OrdersLedger>()
}
