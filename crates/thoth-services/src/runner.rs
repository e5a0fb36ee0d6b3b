//! Specification runner — evaluates specifications with an external program.
//!
//! The configured command is run from the catalog root with the
//! specification's root-relative path appended to its arguments. Exit status 0 is a pass. Results
//! are cached on the specification until an implementation of its
//! interface changes.

use std::path::PathBuf;

use thoth_core::config::EvaluationConfig;
use thoth_core::entity::{Entity, Specification};
use thoth_core::wire::{EvaluationResponse, SpecificationResult};

use crate::registry::{Registry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone)]
pub struct SpecRunner {
    command: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl SpecRunner {
    pub fn new(settings: &EvaluationConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
            work_dir: work_dir.into(),
        }
    }

    /// Evaluate one specification, reusing a still-valid cached result.
    pub async fn evaluate(&self, spec: &Specification) -> Result<bool, RunnerError> {
        if let Some(passed) = spec.last_result() {
            return Ok(passed);
        }

        let output = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(spec.relative_path())
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let passed = output.status.success();
        if !passed {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::info!(
                interface = spec.interface_name(),
                spec = spec.name(),
                code = output.status.code().unwrap_or(-1),
                stderr = %stderr.trim(),
                "specification failed"
            );
        }
        spec.record_result(passed);
        Ok(passed)
    }

    /// Evaluate every specification of `interface`. Passes when all pass.
    pub async fn evaluate_interface(
        &self,
        registry: &Registry<Specification>,
        interface: &str,
    ) -> Result<EvaluationResponse, RunnerError> {
        let mut results = Vec::new();
        for spec in registry.find_all_by_interface(interface).await? {
            let passed = self.evaluate(&spec).await?;
            results.push(SpecificationResult {
                name: spec.name().to_string(),
                passed,
            });
        }

        let passed = results.iter().all(|r| r.passed);
        tracing::info!(interface, specs = results.len(), passed, "interface evaluated");
        Ok(EvaluationResponse {
            interface: interface.to_string(),
            passed,
            results,
        })
    }
}
