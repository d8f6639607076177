//! Turn an expanded catalog into an execution plan.

use declarative::{BoxedResource, ExecutionPlan};
use std::sync::Arc;

use super::{Catalog, RunContext};
use crate::resource::{
    CleanupHandler, DeclaredResource, HostHandler, PackageHandler, TemporaryFileHandler,
};

/// One handler per catalog entry, in catalog order, all sharing `run`.
pub fn build_plan(catalog: &Arc<Catalog>, run: &Arc<RunContext>) -> ExecutionPlan {
    let mut plan = ExecutionPlan::new();

    for resource in catalog.resources() {
        let handler: BoxedResource = match resource {
            DeclaredResource::Download(file) => Box::new(TemporaryFileHandler::new(
                file.clone(),
                Arc::clone(catalog),
                Arc::clone(run),
            )),
            DeclaredResource::Cleanup(cleanup) => {
                Box::new(CleanupHandler::new(cleanup.clone(), Arc::clone(run)))
            }
            DeclaredResource::Package(package) => {
                Box::new(PackageHandler::new(package.clone(), Arc::clone(run)))
            }
            DeclaredResource::Host(host) => Box::new(HostHandler::new(host.clone())),
        };
        plan.add_resource(handler);
    }

    log::debug!("Planned {} resources", plan.total_resources());
    plan
}
