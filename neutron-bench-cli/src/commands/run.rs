//! `neutron-bench run` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use neutron_bench_core::config::BenchConfig;
use neutron_bench_core::error::BenchError;
use neutron_bench_core::runner::{Runner, WorkloadReport, generate_task_id};
use neutron_bench_core::scenario::ScenarioRegistry;
use neutron_bench_core::task::TaskFile;
use neutron_bench_neutron::{HttpNeutronClient, NeutronEnv, builtin_registry};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Unknown scenario names are rejected before any credential is used.
///
/// # Errors
///
/// * `CliError::ValidationFailed` (exit 3) when a workload was rejected
/// * `CliError::IterationsFailed` (exit 4) when an iteration failed
pub async fn execute(
    args: RunArgs,
    config: &BenchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let task = TaskFile::load(&args.task).await?;
    let registry = builtin_registry::<HttpNeutronClient>().map_err(BenchError::from)?;
    check_scenarios(&registry, &task)?;

    info!(
        task = %args.task.display(),
        workloads = task.workloads.len(),
        "connecting to openstack"
    );
    let env = NeutronEnv::connect(&config.openstack).await?;
    let facts = env.discover_facts().await?;

    let runner = Runner::new(&registry, &env, &facts, generate_task_id());
    let report = run_workloads(&runner, &task, args.task.display().to_string()).await?;

    writer.render(&report)?;
    report.outcome()
}

fn check_scenarios<E: Sync>(registry: &ScenarioRegistry<E>, task: &TaskFile) -> Result<(), CliError> {
    for workload in &task.workloads {
        registry
            .require(&workload.scenario)
            .map_err(BenchError::from)?;
    }
    Ok(())
}

/// Runs every workload of `task` in file order.
pub async fn run_workloads<E: Sync>(
    runner: &Runner<'_, E>,
    task: &TaskFile,
    source: String,
) -> Result<RunReport, CliError> {
    let mut workloads = Vec::with_capacity(task.workloads.len());
    for workload in &task.workloads {
        let report = runner.run_workload(workload).await?;
        workloads.push(WorkloadSummary::new(report));
    }

    Ok(RunReport {
        task_id: runner.task_id().to_owned(),
        source,
        workloads,
    })
}

/// Per atomic action statistics over one workload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionStats {
    pub name: String,
    pub count: usize,
    pub failed: usize,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Groups the recorded actions by name, in first-seen order.
pub fn action_stats(report: &WorkloadReport) -> Vec<ActionStats> {
    let mut stats: Vec<(ActionStats, f64)> = Vec::new();

    for action in report.iterations.iter().flat_map(|i| &i.atomic_actions) {
        let idx = match stats.iter().position(|(s, _)| s.name == action.name) {
            Some(idx) => idx,
            None => {
                stats.push((
                    ActionStats {
                        name: action.name.clone(),
                        count: 0,
                        failed: 0,
                        min: f64::MAX,
                        avg: 0.0,
                        max: 0.0,
                    },
                    0.0,
                ));
                stats.len() - 1
            }
        };
        let (entry, total) = &mut stats[idx];
        entry.count += 1;
        if action.failed {
            entry.failed += 1;
        }
        entry.min = entry.min.min(action.duration);
        entry.max = entry.max.max(action.duration);
        *total += action.duration;
    }

    stats
        .into_iter()
        .map(|(mut s, total)| {
            s.avg = total / s.count as f64;
            s
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct WorkloadSummary {
    #[serde(flatten)]
    pub report: WorkloadReport,
    pub actions: Vec<ActionStats>,
}

impl WorkloadSummary {
    pub fn new(report: WorkloadReport) -> Self {
        let actions = action_stats(&report);
        Self { report, actions }
    }
}

/// Result of one `run`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub task_id: String,
    pub source: String,
    pub workloads: Vec<WorkloadSummary>,
}

impl RunReport {
    /// Maps the report to the command result. Validation failures win over
    /// failed iterations.
    pub fn outcome(&self) -> Result<(), CliError> {
        let invalid = self
            .workloads
            .iter()
            .filter(|w| !w.report.is_valid())
            .count();
        if invalid > 0 {
            return Err(CliError::ValidationFailed(format!(
                "{} of {} workloads rejected",
                invalid,
                self.workloads.len()
            )));
        }

        let (failed, total) = self.workloads.iter().fold((0, 0), |(f, t), w| {
            (f + w.report.failed(), t + w.report.iterations.len())
        });
        if failed > 0 {
            return Err(CliError::IterationsFailed(format!(
                "{} of {} iterations failed",
                failed, total
            )));
        }

        Ok(())
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Task: {} (id {})", self.source.bold(), self.task_id)?;

        for summary in &self.workloads {
            let report = &summary.report;
            writeln!(w)?;
            writeln!(w, "{} x{}", report.scenario.cyan().bold(), report.times)?;

            if !report.is_valid() {
                writeln!(w, "  Result: {}", "REJECTED".red().bold())?;
                for failure in &report.validation_errors {
                    writeln!(w, "  Validation: {}", failure.red())?;
                }
                continue;
            }

            let result = format!("{} succeeded, {} failed", report.succeeded(), report.failed());
            if report.failed() > 0 {
                writeln!(w, "  Result: {}", result.yellow().bold())?;
            } else {
                writeln!(w, "  Result: {}", result.green().bold())?;
            }

            if !summary.actions.is_empty() {
                writeln!(
                    w,
                    "  {:<40} {:>6} {:>7} {:>9} {:>9} {:>9}",
                    "Action", "Count", "Failed", "Min (s)", "Avg (s)", "Max (s)"
                )?;
                writeln!(w, "  {}", "-".repeat(85))?;
                for a in &summary.actions {
                    writeln!(
                        w,
                        "  {:<40} {:>6} {:>7} {:>9.3} {:>9.3} {:>9.3}",
                        a.name, a.count, a.failed, a.min, a.avg, a.max
                    )?;
                }
            }

            for iteration in report.iterations.iter().filter(|i| i.error.is_some()) {
                if let Some(ref error) = iteration.error {
                    writeln!(w, "  Iteration {}: {}", iteration.index, error.red())?;
                }
            }
        }

        Ok(())
    }
}
