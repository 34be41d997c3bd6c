//! `neutron-bench scenarios` command handler

use std::io::Write;

use serde::Serialize;

use neutron_bench_core::error::BenchError;
use neutron_bench_core::scenario::{ContextSpec, ScenarioInfo};
use neutron_bench_core::validation::Validator;
use neutron_bench_neutron::{HttpNeutronClient, builtin_registry};

use crate::cli::{ScenariosAction, ScenariosArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scenarios` command.
pub fn execute(args: ScenariosArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let registry = builtin_registry::<HttpNeutronClient>().map_err(BenchError::from)?;

    match args.action {
        ScenariosAction::List => {
            let report = ScenarioListReport::from_infos(registry.list());
            writer.render(&report)
        }
        ScenariosAction::Show { name } => {
            let scenario = registry.require(&name).map_err(BenchError::from)?;
            let report = ScenarioDetailReport::from(scenario.info());
            writer.render(&report)
        }
    }
}

/// One row of `scenarios list`.
#[derive(Debug, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub description: String,
    pub validators: usize,
}

#[derive(Debug, Serialize)]
pub struct ScenarioListReport {
    pub scenarios: Vec<ScenarioSummary>,
    pub total: usize,
}

impl ScenarioListReport {
    pub fn from_infos(infos: Vec<&ScenarioInfo>) -> Self {
        let scenarios: Vec<ScenarioSummary> = infos
            .into_iter()
            .map(|info| ScenarioSummary {
                name: info.name.clone(),
                description: info.description.clone(),
                validators: info.validators.len(),
            })
            .collect();
        let total = scenarios.len();
        Self { scenarios, total }
    }
}

impl Render for ScenarioListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Registered Scenarios".bold())?;
        writeln!(w)?;

        if self.scenarios.is_empty() {
            writeln!(w, "  No scenarios registered.")?;
            return Ok(());
        }

        let width = self
            .scenarios
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);
        for scenario in &self.scenarios {
            writeln!(
                w,
                "  {:<width$}  {}",
                scenario.name.cyan(),
                scenario.description,
                width = width
            )?;
        }

        writeln!(w)?;
        writeln!(w, "Total: {} scenarios", self.total)?;
        Ok(())
    }
}

/// Full metadata of one scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioDetailReport {
    pub name: String,
    pub description: String,
    pub validators: Vec<Validator>,
    pub context: ContextSpec,
}

impl From<&ScenarioInfo> for ScenarioDetailReport {
    fn from(info: &ScenarioInfo) -> Self {
        Self {
            name: info.name.clone(),
            description: info.description.clone(),
            validators: info.validators.clone(),
            context: info.context.clone(),
        }
    }
}

impl Render for ScenarioDetailReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scenario: {}", self.name.bold())?;
        writeln!(w, "  {}", self.description)?;
        writeln!(w)?;

        writeln!(w, "Validators:")?;
        if self.validators.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for validator in &self.validators {
            writeln!(w, "  - {validator}")?;
        }

        writeln!(w)?;
        writeln!(w, "Cleanup contexts:")?;
        if !self.context.admin_cleanup.is_empty() {
            writeln!(w, "  admin_cleanup: {}", self.context.admin_cleanup.join(", "))?;
        }
        if !self.context.cleanup.is_empty() {
            writeln!(w, "  cleanup:       {}", self.context.cleanup.join(", "))?;
        }
        if self.context.admin_cleanup.is_empty() && self.context.cleanup.is_empty() {
            writeln!(w, "  (none)")?;
        }

        Ok(())
    }
}
