//! `tempfetch plan` - show apply order without changing anything

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::Session;
use crate::Context;
use crate::engine::build_plan;
use crate::resource::{DeclaredResource, Ensure};
use crate::ui;

pub fn run(ctx: &Context, manifest: &Path) -> Result<()> {
    let session = Session::load(manifest)?;
    if session.catalog.is_empty() {
        ui::warn("Manifest declares no resources");
        return Ok(());
    }
    let plan = build_plan(&session.catalog, &session.run);
    let levels = plan.levels()?;

    ui::header(&format!("Plan for {}", manifest.display()));
    ui::kv("resources", &plan.total_resources().to_string());
    ui::kv("levels", &levels.len().to_string());

    let entries = session.catalog.resources();
    for (n, level) in levels.iter().enumerate() {
        ui::section(&format!("Level {}", n + 1));

        for &i in level {
            // build_plan keeps catalog order
            let entry = &entries[i];
            println!("  {} {}", entry.reference(), note(&session, entry));

            if ctx.verbose > 0 {
                ui::dim(&plan.resources[i].description());
                if let DeclaredResource::Host(host) = entry {
                    for (key, value) in &host.attributes {
                        ui::kv(key, &value.to_string());
                    }
                }
            }
            if !entry.depends_on().is_empty() {
                let after: Vec<String> =
                    entry.depends_on().iter().map(ToString::to_string).collect();
                ui::dim(&format!("after {}", after.join(", ")));
            }
        }
    }

    Ok(())
}

fn note(session: &Session, entry: &DeclaredResource) -> String {
    match entry {
        DeclaredResource::Download(file) => match file.ensure {
            Ensure::Absent => "remove if present".yellow().to_string(),
            Ensure::Present => {
                if session
                    .catalog
                    .is_required(file.reference(), session.run.packages.as_ref())
                {
                    "will fetch".green().to_string()
                } else {
                    "not required".dimmed().to_string()
                }
            }
        },
        DeclaredResource::Cleanup(cleanup) => {
            format!("deletes {} if fetched", cleanup.path.display())
                .dimmed()
                .to_string()
        }
        DeclaredResource::Package(package) => format!("ensure {}", package.ensure),
        DeclaredResource::Host(_) => "ordering only".dimmed().to_string(),
    }
}
