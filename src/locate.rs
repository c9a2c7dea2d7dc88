//! Module-identity resolution from source locations.
//!
//! Every service and every consumer belongs to at most one logical module,
//! inferred from where its code lives: a path segment `modules/<name>/`
//! yields the module `<name>`, a segment `providers/<name>/` yields the
//! namespaced identity `provider:<name>`. Code living under neither
//! convention (framework glue, bootstrap, tests) has no module identity.
//!
//! Call sites are captured with `#[track_caller]`, so the resolved location
//! is the user's code, never a frame inside this crate. Every public entry
//! point that eventually reaches [`CallSite::capture`] must carry the
//! attribute itself, otherwise the captured file would be ours.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Namespace prefix for provider identities in their textual form.
pub const PROVIDER_PREFIX: &str = "provider:";

const MODULES_SEGMENT: &str = "modules";
const PROVIDERS_SEGMENT: &str = "providers";

/// Ownership identity of a piece of code: a plain module or a
/// `provider:`-namespaced third-party integration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleId {
    Module(String),
    Provider(String),
}

impl ModuleId {
    /// Parse the textual form: `"provider:stripe"` is a provider,
    /// anything else a plain module name.
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix(PROVIDER_PREFIX) {
            Some(name) => ModuleId::Provider(name.to_owned()),
            None => ModuleId::Module(s.to_owned()),
        }
    }

    /// Bare name without the provider namespace.
    pub fn name(&self) -> &str {
        match self {
            ModuleId::Module(n) | ModuleId::Provider(n) => n,
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, ModuleId::Provider(_))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Module(n) => f.write_str(n),
            ModuleId::Provider(n) => write!(f, "{PROVIDER_PREFIX}{n}"),
        }
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        ModuleId::parse(s)
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        ModuleId::parse(&s)
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.to_string()
    }
}

/// Infer the owning module from a textual trace (a file path, or several
/// frame lines of a captured stack). Scans the whole trace for a
/// `modules/<name>/` segment first; only if none matches does it fall back
/// to `providers/<name>/`. Returns `None` when neither convention matches,
/// which marks the code as ambient (no module home).
pub fn resolve_module(trace: &str) -> Option<ModuleId> {
    if let Some(name) = trace
        .lines()
        .find_map(|line| dir_after_segment(line, MODULES_SEGMENT))
    {
        return Some(ModuleId::Module(name));
    }
    trace
        .lines()
        .find_map(|line| dir_after_segment(line, PROVIDERS_SEGMENT))
        .map(ModuleId::Provider)
}

/// First directory name following a `<marker>/` path segment in `line`.
/// The name must itself be followed by another segment, so a file sitting
/// directly under `modules/` does not claim a module identity.
fn dir_after_segment(line: &str, marker: &str) -> Option<String> {
    let segments: Vec<&str> = line.split(['/', '\\']).collect();
    segments.windows(3).find_map(|w| {
        (w[0] == marker && !w[1].trim().is_empty()).then(|| w[1].trim().to_owned())
    })
}

/// A captured declaration or resolution site.
///
/// `Location` data is `'static` and cheap to copy; the registry keeps the
/// declaration site of every service for duplicate-registration diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct CallSite(&'static Location<'static>);

impl CallSite {
    /// Capture the immediate caller. Keep `#[track_caller]` on every
    /// public function between user code and this call.
    #[track_caller]
    pub fn capture() -> Self {
        CallSite(Location::caller())
    }

    pub fn file(&self) -> &'static str {
        self.0.file()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.0
    }

    /// Module identity of the captured site, per [`resolve_module`].
    pub fn module(&self) -> Option<ModuleId> {
        resolve_module(self.0.file())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_segment_wins() {
        let got = resolve_module("/app/src/modules/orders/orders.service.ts");
        assert_eq!(got, Some(ModuleId::Module("orders".into())));
    }

    #[test]
    fn provider_segment_is_namespaced() {
        let got = resolve_module("/app/src/providers/stripe/x.ts");
        assert_eq!(got, Some(ModuleId::Provider("stripe".into())));
        assert_eq!(got.unwrap().to_string(), "provider:stripe");
    }

    #[test]
    fn modules_take_precedence_over_providers_across_the_trace() {
        let trace = "at /app/src/providers/stripe/client.ts:3:1\nat /app/src/modules/billing/billing.service.ts:9:2";
        assert_eq!(resolve_module(trace), Some(ModuleId::Module("billing".into())));
    }

    #[test]
    fn unmatched_trace_is_ambient() {
        assert_eq!(resolve_module("/app/src/core/bootstrap.ts"), None);
        assert_eq!(resolve_module(""), None);
    }

    #[test]
    fn file_directly_under_modules_has_no_module() {
        assert_eq!(resolve_module("/app/src/modules/loose-file.ts"), None);
    }

    #[test]
    fn backslash_paths_match_too() {
        let got = resolve_module(r"C:\app\src\modules\orders\orders.service.ts");
        assert_eq!(got, Some(ModuleId::Module("orders".into())));
    }

    #[test]
    fn module_id_round_trips_through_text() {
        assert_eq!(ModuleId::parse("orders"), ModuleId::Module("orders".into()));
        assert_eq!(
            ModuleId::parse("provider:redis"),
            ModuleId::Provider("redis".into())
        );
        assert_eq!(ModuleId::parse("provider:redis").name(), "redis");
        assert!(ModuleId::parse("provider:redis").is_provider());
    }
}
