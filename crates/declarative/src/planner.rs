//! Execution planner - builds dependency-ordered execution plans

use std::collections::HashMap;

use crate::error::{PlanError, Result};
use crate::resource::BoxedResource;

/// An execution plan: resources plus the edges they declare
///
/// Resources keep declaration order; [`ExecutionPlan::levels`] turns the
/// declared `depends_on` edges into apply order.
pub struct ExecutionPlan {
    /// Resources in declaration order
    pub resources: Vec<BoxedResource>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Add a resource to the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Group resource indices into dependency levels
    ///
    /// Every resource in level `n` depends only on resources in levels
    /// `< n`. Within a level, declaration order is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DuplicateId`] for repeated ids,
    /// [`PlanError::UnknownDependency`] for edges to ids that were never
    /// declared, [`PlanError::SelfDependency`] for a resource listing
    /// itself, and [`PlanError::Cycle`] when no order exists.
    pub fn levels(&self) -> Result<Vec<Vec<usize>>> {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(self.resources.len());
        for (i, resource) in self.resources.iter().enumerate() {
            if index.insert(resource.id(), i).is_some() {
                return Err(PlanError::DuplicateId(resource.id()));
            }
        }

        let mut in_degree = vec![0usize; self.resources.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.resources.len()];

        for (i, resource) in self.resources.iter().enumerate() {
            let mut seen = Vec::new();
            for dep in resource.depends_on() {
                let Some(&d) = index.get(&dep) else {
                    return Err(PlanError::UnknownDependency {
                        resource: resource.id(),
                        dependency: dep,
                    });
                };
                if d == i {
                    return Err(PlanError::SelfDependency(resource.id()));
                }
                if seen.contains(&d) {
                    continue;
                }
                seen.push(d);
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut levels = Vec::new();
        let mut current: Vec<usize> = (0..self.resources.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut placed = 0;

        while !current.is_empty() {
            placed += current.len();
            let mut next = Vec::new();
            for &i in &current {
                for &dependent in &dependents[i] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            next.sort_unstable();
            levels.push(current);
            current = next;
        }

        if placed != self.resources.len() {
            let stuck = self
                .resources
                .iter()
                .enumerate()
                .filter(|(i, _)| in_degree[*i] > 0)
                .map(|(_, r)| r.id())
                .collect();
            return Err(PlanError::Cycle(stuck));
        }

        Ok(levels)
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}
