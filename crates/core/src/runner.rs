//! Sequential workload runner.
//!
//! Validates a workload once, then runs its iterations one after another.
//! A failing iteration is recorded and the next one still runs.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::atomic::{AtomicAction, AtomicActions};
use crate::error::{BenchError, ValidationError};
use crate::metrics as m;
use crate::scenario::{ScenarioContext, ScenarioRegistry};
use crate::task::Workload;
use crate::validation::{PlatformFacts, validate};

/// Fresh random task id (UUID v4).
pub fn generate_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Outcome of one iteration.
#[derive(Debug, Clone, Serialize)]
pub struct IterationResult {
    pub index: usize,
    /// Seconds
    pub duration: f64,
    pub atomic_actions: Vec<AtomicAction>,
    pub error: Option<String>,
}

/// Outcome of one workload.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub scenario: String,
    pub times: usize,
    /// Non-empty when validation rejected the workload; no iteration ran then.
    pub validation_errors: Vec<String>,
    pub iterations: Vec<IterationResult>,
}

impl WorkloadReport {
    pub fn succeeded(&self) -> usize {
        self.iterations.iter().filter(|i| i.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.iterations.iter().filter(|i| i.error.is_some()).count()
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }
}

/// Runs workloads of one task against a fixed environment.
pub struct Runner<'a, E: Sync> {
    registry: &'a ScenarioRegistry<E>,
    env: &'a E,
    facts: &'a PlatformFacts,
    task_id: String,
}

impl<'a, E: Sync> Runner<'a, E> {
    pub fn new(
        registry: &'a ScenarioRegistry<E>,
        env: &'a E,
        facts: &'a PlatformFacts,
        task_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            env,
            facts,
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Validates and runs `workload`.
    ///
    /// Returns `Err` only when the scenario is not registered.
    pub async fn run_workload(&self, workload: &Workload) -> Result<WorkloadReport, BenchError> {
        let scenario = self.registry.require(&workload.scenario)?;
        let name = scenario.info().name.clone();

        let mut report = WorkloadReport {
            scenario: name.clone(),
            times: workload.times,
            validation_errors: Vec::new(),
            iterations: Vec::with_capacity(workload.times),
        };

        let mut failures = match validate(scenario.info(), &workload.args, self.facts) {
            Ok(()) => Vec::new(),
            Err(ValidationError::Failed { failures, .. }) => failures,
        };
        if let Err(e) = scenario.check_args(&workload.args) {
            failures.push(e.to_string());
        }

        if !failures.is_empty() {
            warn!(scenario = %name, failures = ?failures, "workload failed validation");
            metrics::counter!(m::VALIDATION_FAILURES_TOTAL, m::LABEL_SCENARIO => name.clone())
                .increment(1);
            report.validation_errors = failures;
            return Ok(report);
        }

        info!(scenario = %name, times = workload.times, task_id = %self.task_id, "running workload");

        for index in 0..workload.times {
            let ctx = ScenarioContext::for_iteration(
                self.task_id.as_str(),
                index,
                self.facts.user_count,
            );
            let actions = AtomicActions::new();
            let start = Instant::now();
            let outcome = scenario
                .run(self.env, &ctx, &workload.args, &actions)
                .await;
            let duration = start.elapsed().as_secs_f64();

            let result_label = if outcome.is_ok() { "success" } else { "failure" };
            metrics::counter!(
                m::ITERATIONS_TOTAL,
                m::LABEL_SCENARIO => name.clone(),
                m::LABEL_RESULT => result_label
            )
            .increment(1);
            metrics::histogram!(m::ITERATION_DURATION_SECONDS, m::LABEL_SCENARIO => name.clone())
                .record(duration);

            let error = match outcome {
                Ok(()) => None,
                Err(e) => {
                    warn!(scenario = %name, iteration = index, error = %e, "iteration failed");
                    Some(e.to_string())
                }
            };

            report.iterations.push(IterationResult {
                index,
                duration,
                atomic_actions: actions.into_inner(),
                error,
            });
        }

        info!(
            scenario = %name,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "workload finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;

    use crate::atomic::AtomicActions;
    use crate::error::{ClientError, ScenarioError};
    use crate::scenario::{ContextSpec, Scenario, ScenarioArgs, ScenarioInfo, decode_args};
    use crate::validation::{PLATFORM_OPENSTACK, Validator};

    /// Records which user each iteration saw; fails on odd iterations.
    #[derive(Default)]
    struct Env {
        seen_users: Mutex<Vec<Option<usize>>>,
    }

    impl Env {
        fn record(&self, user: Option<usize>) {
            self.seen_users.lock().unwrap().push(user);
        }
    }

    struct Flaky {
        info: ScenarioInfo,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct FlakyArgs {
        #[serde(default)]
        mode: Option<String>,
    }

    impl Flaky {
        fn new() -> Self {
            Self {
                info: ScenarioInfo {
                    name: "Dummy.flaky".to_owned(),
                    description: String::new(),
                    validators: vec![
                        Validator::Enum {
                            param: "mode".to_owned(),
                            values: vec!["a".to_owned(), "b".to_owned()],
                            missed: true,
                        },
                        Validator::RequiredPlatform {
                            platform: PLATFORM_OPENSTACK.to_owned(),
                            admin: true,
                            users: true,
                        },
                    ],
                    context: ContextSpec::default(),
                },
            }
        }
    }

    impl Scenario<Env> for Flaky {
        fn info(&self) -> &ScenarioInfo {
            &self.info
        }

        fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
            decode_args::<FlakyArgs>(&self.info.name, args).map(|_| ())
        }

        async fn run(
            &self,
            env: &Env,
            ctx: &ScenarioContext,
            _args: &ScenarioArgs,
            actions: &AtomicActions,
        ) -> Result<(), BenchError> {
            env.record(ctx.user_index);
            let fail = ctx.iteration % 2 == 1;
            actions
                .timed("dummy.call", async {
                    if fail {
                        Err(ClientError::Transport("connection reset".to_owned()))
                    } else {
                        Ok(())
                    }
                })
                .await?;
            Ok(())
        }
    }

    fn registry() -> ScenarioRegistry<Env> {
        let mut registry = ScenarioRegistry::new();
        registry.register(Box::new(Flaky::new())).unwrap();
        registry
    }

    fn facts() -> PlatformFacts {
        PlatformFacts {
            platform: PLATFORM_OPENSTACK.to_owned(),
            has_admin: true,
            user_count: 2,
            services: vec!["network".to_owned()],
            neutron_extensions: vec!["bgpvpn".to_owned()],
        }
    }

    fn workload(times: usize, args: serde_json::Value) -> Workload {
        Workload {
            scenario: "Dummy.flaky".to_owned(),
            times,
            args: args.as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn failed_iteration_does_not_stop_the_workload() {
        let registry = registry();
        let env = Env::default();
        let facts = facts();
        let runner = Runner::new(&registry, &env, &facts, "task-1");

        let report = runner.run_workload(&workload(4, json!({}))).await.unwrap();
        assert!(report.is_valid());
        assert_eq!(report.iterations.len(), 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 2);

        let failed = &report.iterations[1];
        assert!(failed.error.as_deref().unwrap().contains("connection reset"));
        assert!(failed.atomic_actions[0].failed);
    }

    #[tokio::test]
    async fn iterations_use_users_round_robin() {
        let registry = registry();
        let env = Env::default();
        let facts = facts();
        let runner = Runner::new(&registry, &env, &facts, "task-1");

        runner.run_workload(&workload(3, json!({}))).await.unwrap();
        let seen = env.seen_users.lock().unwrap().clone();
        assert_eq!(seen, vec![Some(0), Some(1), Some(0)]);
    }

    #[tokio::test]
    async fn validation_failure_runs_no_iteration() {
        let registry = registry();
        let env = Env::default();
        let facts = facts();
        let runner = Runner::new(&registry, &env, &facts, "task-1");

        let report = runner
            .run_workload(&workload(3, json!({"mode": "c"})))
            .await
            .unwrap();
        assert!(!report.is_valid());
        assert!(report.iterations.is_empty());
        assert!(report.validation_errors[0].contains("mode"));
        assert!(env.seen_users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_args_reject_the_workload_before_any_iteration() {
        let registry = registry();
        let env = Env::default();
        let facts = facts();
        let runner = Runner::new(&registry, &env, &facts, "task-1");

        let report = runner
            .run_workload(&workload(3, json!({"mdoe": "a"})))
            .await
            .unwrap();
        assert!(!report.is_valid());
        assert!(report.iterations.is_empty());
        assert_eq!(report.validation_errors.len(), 1);
        assert!(report.validation_errors[0].contains("invalid arguments for 'Dummy.flaky'"));
        assert!(report.validation_errors[0].contains("mdoe"));
        assert!(env.seen_users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn validator_and_argument_failures_are_reported_together() {
        let registry = registry();
        let env = Env::default();
        let facts = facts();
        let runner = Runner::new(&registry, &env, &facts, "task-1");

        let report = runner
            .run_workload(&workload(1, json!({"mode": "c", "extra": true})))
            .await
            .unwrap();
        assert_eq!(report.validation_errors.len(), 2, "{:?}", report.validation_errors);
        assert!(report.validation_errors[0].contains("mode"));
        assert!(report.validation_errors[1].contains("extra"));
    }

    #[test]
    fn generated_task_ids_are_unique_uuids() {
        let a = generate_task_id();
        let b = generate_task_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(ScenarioContext::for_iteration(a.as_str(), 0, 0).task_prefix().len(), 8);
    }

    #[tokio::test]
    async fn unknown_scenario_is_an_error() {
        let registry = registry();
        let env = Env::default();
        let facts = facts();
        let runner = Runner::new(&registry, &env, &facts, "task-1");

        let mut w = workload(1, json!({}));
        w.scenario = "Dummy.nope".to_owned();
        let err = runner.run_workload(&w).await.unwrap_err();
        assert!(matches!(
            err,
            BenchError::Scenario(ScenarioError::NotFound { .. })
        ));
    }
}
