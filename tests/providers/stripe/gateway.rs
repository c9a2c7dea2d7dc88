//! Declarations living under `providers/stripe/`; inferred identity is the
//! namespaced `provider:stripe`.

use std::sync::Arc;
use svcgate::prelude::*;

#[derive(Debug)]
pub struct StripeGateway {
    pub live: bool,
}

pub fn declare_gateway(registry: &ServiceRegistry) -> Result<Arc<StripeGateway>> {
    registry.declare::<StripeGateway>().provide(StripeGateway { live: false })
}

pub fn resolve_gateway(registry: &ServiceRegistry) -> Result<Arc<StripeGateway>> {
    registry.resolve::<StripeGateway>()
}
