//! System package resource
//!
//! Installs or removes a package through the host's package manager. Its
//! installed state is also what decides whether a download feeding it is
//! still needed.

use anyhow::{Context, Result, bail};
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use std::collections::BTreeSet;
use std::process::{Command, Output};
use std::sync::Arc;

use super::{Ensure, PACKAGE, ResourceRef};
use crate::config::PackageCommands;
use crate::engine::RunContext;

/// Query and change installed packages.
pub trait PackageManager: Send + Sync {
    fn is_installed(&self, name: &str) -> Result<bool>;
    fn install(&self, name: &str) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// [`PackageManager`] that runs the configured command templates.
#[derive(Debug, Clone)]
pub struct CommandPackageManager {
    commands: PackageCommands,
}

impl CommandPackageManager {
    pub fn new(commands: PackageCommands) -> Self {
        Self { commands }
    }

    fn run(&self, template: &str, name: &str) -> Result<Output> {
        let argv = render(template, name);
        let Some((program, args)) = argv.split_first() else {
            bail!("Empty package command template");
        };

        log::debug!("Running {}", argv.join(" "));
        Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {program}"))
    }

    fn run_checked(&self, template: &str, name: &str) -> Result<()> {
        let output = self.run(template, name)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "'{}' failed: {}",
                render(template, name).join(" "),
                stderr.trim()
            );
        }
        Ok(())
    }
}

/// Split a template on whitespace and substitute `{name}` in every word.
fn render(template: &str, name: &str) -> Vec<String> {
    template
        .split_whitespace()
        .map(|word| word.replace("{name}", name))
        .collect()
}

impl PackageManager for CommandPackageManager {
    fn is_installed(&self, name: &str) -> Result<bool> {
        Ok(self.run(&self.commands.query, name)?.status.success())
    }

    fn install(&self, name: &str) -> Result<()> {
        self.run_checked(&self.commands.install, name)
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.run_checked(&self.commands.remove, name)
    }
}

/// A declared `package`.
#[derive(Debug, Clone)]
pub struct Package {
    pub reference: ResourceRef,
    /// Name handed to the package manager. Defaults to the resource name.
    pub package_name: String,
    pub ensure: Ensure,
    pub depends_on: BTreeSet<ResourceRef>,
}

impl Package {
    pub fn new(name: &str) -> Self {
        Self {
            reference: ResourceRef::new(PACKAGE, name),
            package_name: name.to_string(),
            ensure: Ensure::Present,
            depends_on: BTreeSet::new(),
        }
    }

    pub fn with_package_name(mut self, package_name: &str) -> Self {
        self.package_name = package_name.to_string();
        self
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    pub fn with_depends_on(mut self, refs: impl IntoIterator<Item = ResourceRef>) -> Self {
        self.depends_on.extend(refs);
        self
    }
}

#[derive(Debug)]
pub struct PackageHandler {
    package: Package,
    run: Arc<RunContext>,
}

impl PackageHandler {
    pub fn new(package: Package, run: Arc<RunContext>) -> Self {
        Self { package, run }
    }
}

impl Resource for PackageHandler {
    fn id(&self) -> String {
        self.package.reference.to_string()
    }

    fn description(&self) -> String {
        format!("Package: {}", self.package.package_name)
    }

    fn resource_type(&self) -> &'static str {
        PACKAGE
    }

    fn depends_on(&self) -> Vec<String> {
        self.package
            .depends_on
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.run.packages.is_installed(&self.package.package_name)? {
            Ok(ResourceState::Present { details: None })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        match self.package.ensure {
            Ensure::Present => ResourceState::Present { details: None },
            Ensure::Absent => ResourceState::Absent,
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        let name = &self.package.package_name;
        let installed = self.run.packages.is_installed(name)?;

        match (self.package.ensure, installed) {
            (Ensure::Present, false) => {
                self.run
                    .packages
                    .install(name)
                    .with_context(|| format!("Failed to install {name}"))?;
                Ok(ApplyResult::Created)
            }
            (Ensure::Absent, true) => {
                self.run
                    .packages
                    .remove(name)
                    .with_context(|| format!("Failed to remove {name}"))?;
                Ok(ApplyResult::Removed)
            }
            _ => Ok(ApplyResult::NoChange),
        }
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryPackages;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::run_context;
    use fetchkit::MockFetcher;

    #[test]
    fn test_render_substitutes_name() {
        assert_eq!(
            render("apt-get install -y {name}", "curl"),
            vec!["apt-get", "install", "-y", "curl"]
        );
        assert_eq!(
            render("pkg  query --name={name}", "jq"),
            vec!["pkg", "query", "--name=jq"]
        );
        assert!(render("   ", "x").is_empty());
    }

    #[test]
    fn test_empty_template_is_error() {
        let manager = CommandPackageManager::new(PackageCommands {
            query: String::new(),
            ..PackageCommands::default()
        });
        assert!(manager.is_installed("curl").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_status_is_installed_state() {
        let manager = CommandPackageManager::new(PackageCommands {
            query: "true {name}".to_string(),
            install: "false {name}".to_string(),
            remove: "true {name}".to_string(),
        });

        assert!(manager.is_installed("anything").unwrap());
        assert!(manager.install("anything").is_err());
        assert!(manager.remove("anything").is_ok());
    }

    #[test]
    fn test_install_missing_package() {
        let packages = MemoryPackages::new();
        let run = run_context(&MockFetcher::new(), &packages);
        let handler = PackageHandler::new(Package::new("jdk"), run);

        assert!(handler.needs_apply().unwrap());
        let result = handler.apply(&mut ApplyContext::new(false, false)).unwrap();

        assert!(matches!(result, ApplyResult::Created));
        assert!(packages.installed().contains("jdk"));
        assert!(!handler.needs_apply().unwrap());
    }

    #[test]
    fn test_remove_installed_package() {
        let packages = MemoryPackages::with_installed(["jdk"]);
        let run = run_context(&MockFetcher::new(), &packages);
        let handler = PackageHandler::new(Package::new("jdk").with_ensure(Ensure::Absent), run);

        let result = handler.apply(&mut ApplyContext::new(false, false)).unwrap();

        assert!(matches!(result, ApplyResult::Removed));
        assert!(packages.installed().is_empty());
    }

    #[test]
    fn test_package_name_override() {
        let packages = MemoryPackages::new();
        let run = run_context(&MockFetcher::new(), &packages);
        let handler = PackageHandler::new(
            Package::new("java").with_package_name("openjdk-21-jdk"),
            run,
        );

        handler.apply(&mut ApplyContext::new(false, false)).unwrap();

        assert_eq!(handler.id(), "Package[java]");
        assert!(packages.installed().contains("openjdk-21-jdk"));
    }
}
