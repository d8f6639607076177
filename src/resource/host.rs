//! Resources owned by the host that only take part in ordering.
//!
//! Any kind without its own implementation lands here. It keeps its
//! dependency edges and attributes (so it can require, and be required
//! by, downloads) but applying it never changes anything.

use anyhow::Result;
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use std::collections::{BTreeMap, BTreeSet};

use super::{Ensure, ResourceRef};

#[derive(Debug, Clone)]
pub struct HostResource {
    pub reference: ResourceRef,
    pub ensure: Option<Ensure>,
    pub depends_on: BTreeSet<ResourceRef>,
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl HostResource {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            reference: ResourceRef::new(kind, name),
            ensure: None,
            depends_on: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_ensure(mut self, ensure: Option<Ensure>) -> Self {
        self.ensure = ensure;
        self
    }

    pub fn with_depends_on(mut self, refs: impl IntoIterator<Item = ResourceRef>) -> Self {
        self.depends_on.extend(refs);
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

#[derive(Debug)]
pub struct HostHandler {
    resource: HostResource,
}

impl HostHandler {
    pub fn new(resource: HostResource) -> Self {
        Self { resource }
    }

    fn state(&self) -> ResourceState {
        match self.resource.ensure {
            Some(Ensure::Absent) => ResourceState::Absent,
            _ => ResourceState::Present { details: None },
        }
    }
}

impl Resource for HostHandler {
    fn id(&self) -> String {
        self.resource.reference.to_string()
    }

    fn description(&self) -> String {
        format!("{} (managed by the host)", self.resource.reference)
    }

    fn resource_type(&self) -> &'static str {
        "host"
    }

    fn depends_on(&self) -> Vec<String> {
        self.resource
            .depends_on
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(self.state())
    }

    fn desired_state(&self) -> ResourceState {
        self.state()
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
        Ok(ApplyResult::NoChange)
    }
}
