//! Start-up report: what got registered, grouped by ownership.
//!
//! Emitted once after service discovery finishes, through `tracing`. The
//! JSON rendering exists for dump tooling and assertions in tests.

use crate::locate::ModuleId;
use crate::policy::Visibility;
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub visibility: Visibility,
    pub module: Option<String>,
    pub expose_to: Vec<String>,
}

impl ReportEntry {
    fn from_descriptor(descriptor: &ServiceDescriptor) -> Self {
        ReportEntry {
            name: descriptor.display_name().to_owned(),
            visibility: descriptor.visibility(),
            module: descriptor.owning_module().map(ModuleId::to_string),
            expose_to: descriptor.expose_to().iter().map(ModuleId::to_string).collect(),
        }
    }
}

/// Registered services bucketed into ambient / per-module / per-provider.
/// Buckets and their contents are deterministically ordered.
#[derive(Debug, Default, Serialize)]
pub struct StartupReport {
    pub ambient: Vec<ReportEntry>,
    pub modules: BTreeMap<String, Vec<ReportEntry>>,
    pub providers: BTreeMap<String, Vec<ReportEntry>>,
}

impl StartupReport {
    pub fn collect(registry: &ServiceRegistry) -> Self {
        let mut report = StartupReport::default();
        for descriptor in registry.snapshot() {
            let entry = ReportEntry::from_descriptor(&descriptor);
            match descriptor.owning_module() {
                None => report.ambient.push(entry),
                Some(ModuleId::Module(name)) => {
                    report.modules.entry(name.clone()).or_default().push(entry);
                }
                Some(ModuleId::Provider(name)) => {
                    report.providers.entry(name.clone()).or_default().push(entry);
                }
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.ambient.len()
            + self.modules.values().map(Vec::len).sum::<usize>()
            + self.providers.values().map(Vec::len).sum::<usize>()
    }

    /// One `info` line per bucket.
    pub fn log(&self) {
        tracing::info!(total = self.total(), "service registry start-up report");
        if !self.ambient.is_empty() {
            tracing::info!(services = ?names(&self.ambient), "ambient services");
        }
        for (module, entries) in &self.modules {
            tracing::info!(module = %module, services = ?names(entries), "module services");
        }
        for (provider, entries) in &self.providers {
            tracing::info!(provider = %provider, services = ?names(entries), "provider services");
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn names(entries: &[ReportEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}
