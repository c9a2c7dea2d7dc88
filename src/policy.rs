//! Access policy evaluation.
//!
//! The decision is pure and evaluated in a fixed precedence order; the
//! effectful wrapper adds the audit warning for untraceable callers and
//! builds the denial diagnostic.

use crate::locate::ModuleId;
use crate::registry::ServiceDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who may resolve a service: everyone, or only the owning module plus its
/// explicit expose-to list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

/// Call-site name fragments recognized as framework entry points. Resolves
/// from untraceable callers matching none of these are allowed but logged
/// for audit; denying would make framework glue impossible to write.
const TRUSTED_ENTRY_POINTS: &[&str] = &["main.rs", "bootstrap", "router", "handler"];

/// Pure access decision. Precedence, first match wins:
/// public target; ambient target; untraceable consumer; same module;
/// expose-to membership; otherwise deny.
pub fn can_access(consumer: Option<&ModuleId>, target: &ServiceDescriptor) -> bool {
    if target.visibility() == Visibility::Public {
        return true;
    }
    let Some(owner) = target.owning_module() else {
        return true;
    };
    let Some(consumer) = consumer else {
        return true;
    };
    owner == consumer || target.allows(consumer)
}

/// [`can_access`] plus the audit trail and a structured diagnostic on deny.
pub(crate) fn authorize(
    consumer_name: &str,
    consumer: Option<&ModuleId>,
    target: &ServiceDescriptor,
) -> Result<(), Denial> {
    if target.visibility() == Visibility::Public {
        return Ok(());
    }
    let Some(owner) = target.owning_module() else {
        return Ok(());
    };
    let Some(consumer) = consumer else {
        audit_untraceable(consumer_name, target);
        return Ok(());
    };
    if owner == consumer || target.allows(consumer) {
        return Ok(());
    }
    Err(Denial {
        consumer_name: consumer_name.to_owned(),
        consumer_module: consumer.clone(),
        target_name: target.display_name(),
        target_module: owner.clone(),
        expose_to: target.expose_to().iter().map(ModuleId::to_string).collect(),
    })
}

fn audit_untraceable(consumer_name: &str, target: &ServiceDescriptor) {
    let trusted = TRUSTED_ENTRY_POINTS
        .iter()
        .any(|mark| consumer_name.contains(mark));
    if !trusted {
        tracing::warn!(
            consumer = %consumer_name,
            target = %target.display_name(),
            "caller without module identity accessed a private service; allowed, audit the call site"
        );
    }
}

/// Structured denial diagnostic. The rendered message names the consumer,
/// the target, the target's allow-list and three concrete remediations.
#[derive(Debug, Clone)]
pub struct Denial {
    pub consumer_name: String,
    pub consumer_module: ModuleId,
    pub target_name: &'static str,
    pub target_module: ModuleId,
    pub expose_to: Vec<String>,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "access denied: `{}` (module `{}`) may not use service `{}` owned by module `{}`",
            self.consumer_name, self.consumer_module, self.target_name, self.target_module
        )?;
        if self.expose_to.is_empty() {
            writeln!(f, "the service is private and exposes itself to no other module")?;
        } else {
            writeln!(f, "the service is private and exposed only to {:?}", self.expose_to)?;
        }
        writeln!(f, "to fix, pick one:")?;
        writeln!(f, "  - declare `{}` with visibility \"public\"", self.target_name)?;
        writeln!(
            f,
            "  - add \"{}\" to the expose_to list of `{}`",
            self.consumer_module, self.target_name
        )?;
        write!(
            f,
            "  - remove the dependency of `{}` on `{}`",
            self.consumer_name, self.target_name
        )
    }
}

impl std::error::Error for Denial {}
