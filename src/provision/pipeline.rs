//! Assembles the stage list for a run and drives it in order.

use crate::config::Settings;
use crate::ProvisionError;

use super::steps::{
    Activate, CreateVenv, InstallWhisper, ProvisionContext, ProvisionStep, SystemPackages,
    WhisperSource,
};

/// The ordered stages of one provisioning run.
pub struct Pipeline {
    steps: Vec<Box<dyn ProvisionStep>>,
}

impl Pipeline {
    pub fn new(settings: &Settings, source: WhisperSource, skip_system: bool) -> Self {
        let mut steps: Vec<Box<dyn ProvisionStep>> = Vec::new();

        if !skip_system {
            steps.push(Box::new(SystemPackages {
                packages: settings.system.packages.clone(),
            }));
        }
        steps.push(Box::new(CreateVenv {
            python: settings.env.python.clone(),
            venv_dir: settings.env.venv_dir.clone(),
        }));
        steps.push(Box::new(Activate {
            venv_dir: settings.env.venv_dir.clone(),
        }));
        steps.push(Box::new(InstallWhisper {
            venv_dir: settings.env.venv_dir.clone(),
            source,
        }));

        Self { steps }
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn execute(&self, ctx: &mut ProvisionContext) -> Result<(), ProvisionError> {
        let total = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            println!("=== [{}/{}] {} ===", index + 1, total, step.title());
            step.run(ctx)?;
        }
        Ok(())
    }

    /// Render the commands each stage would run, spawning nothing.
    pub fn render_plan(&self, ctx: &ProvisionContext) -> Vec<String> {
        let total = self.steps.len();
        let mut lines = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            lines.push(format!("[{}/{}] {}", index + 1, total, step.title()));
            for spec in step.commands(ctx) {
                lines.push(format!("  $ {}", spec));
            }
            if let Some(note) = step.plan_note() {
                lines.push(format!("  ({})", note));
            }
        }
        lines
    }
}
