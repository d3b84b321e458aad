//! List command: registered models and available suites

use std::path::Path;

use anyhow::Result;
use colored::*;
use evalbench_core::ModelRegistry;
use evalbench_eval::{HarnessConfig, TaskLoader};

use crate::args::ListTarget;
use crate::console::CliConsole;

pub fn execute(root: &Path, target: ListTarget) -> Result<()> {
    let config = HarnessConfig::new(root);
    match target {
        ListTarget::Models => list_models(&config),
        ListTarget::Suites => list_suites(&config),
    }
}

fn list_models(config: &HarnessConfig) -> Result<()> {
    let registry = ModelRegistry::load(&config.registry_path)?;
    CliConsole::new().print_header("Models");

    println!("{:<28} {:<10} {}", "Id".bold(), "Provider".bold(), "Preset".bold());
    for entry in &registry.models {
        println!(
            "{:<28} {:<10} {}",
            entry.id,
            entry.provider,
            entry.preset.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn list_suites(config: &HarnessConfig) -> Result<()> {
    let console = CliConsole::new();
    let loader = TaskLoader::new(&config.suites_dir);
    let suites = loader.list_suites()?;

    console.print_header("Suites");
    if suites.is_empty() {
        console.warn(&format!("No suites in {}", loader.suites_dir().display()));
        return Ok(());
    }

    for suite in &suites {
        println!("{}", suite.bold());
        for task_dir in loader.discover(suite)? {
            match loader.load(&task_dir) {
                Ok(task) => println!("  {:<36} {}", task.id, task.name),
                Err(e) => console.warn(&format!("  {}: {}", task_dir.display(), e)),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_suites_without_suites_dir() {
        let root = TempDir::new().unwrap();
        assert!(execute(root.path(), ListTarget::Suites).is_ok());
    }

    #[test]
    fn test_list_models_requires_registry() {
        let root = TempDir::new().unwrap();
        assert!(execute(root.path(), ListTarget::Models).is_err());

        std::fs::create_dir_all(root.path().join("models")).unwrap();
        std::fs::write(
            root.path().join("models/registry.yml"),
            "models:\n  - id: mock\n    provider: mock\n",
        )
        .unwrap();
        assert!(execute(root.path(), ListTarget::Models).is_ok());
    }
}
