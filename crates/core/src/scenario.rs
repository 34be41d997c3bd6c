//! Scenarios and their registry.
//!
//! A [`Scenario`] is a named, timed benchmark procedure. It carries
//! declarative metadata ([`ScenarioInfo`]: validators and cleanup contexts)
//! and a `run` body executed once per iteration against an environment `E`
//! that owns the API clients.
//!
//! [`Scenario`] uses RPITIT and therefore cannot be a trait object;
//! [`DynScenario`] is the boxed-future twin stored in [`ScenarioRegistry`].
//! Every `Scenario` is a `DynScenario` through a blanket impl.
//!
//! ```ignore
//! let mut registry = ScenarioRegistry::new();
//! registry.register(Box::new(CreateAndDeleteBgpvpns))?;
//!
//! let scenario = registry.get("NeutronBGPVPN.create_and_delete_bgpvpns").unwrap();
//! scenario.run(&env, &ctx, &args, &actions).await?;
//! ```

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::atomic::AtomicActions;
use crate::error::{BenchError, ScenarioError};
use crate::validation::Validator;

/// Boxed `Send` future used for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw scenario arguments, as written in the task file.
pub type ScenarioArgs = serde_json::Map<String, serde_json::Value>;

/// Cleanup contexts a scenario declares; consumed by the harness, never run here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSpec {
    /// Services cleaned up with admin credentials
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_cleanup: Vec<String>,
    /// Services cleaned up with user credentials
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleanup: Vec<String>,
}

/// Registration metadata of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    /// Unique registered name, e.g. `NeutronBGPVPN.create_and_delete_bgpvpns`
    pub name: String,
    pub description: String,
    pub validators: Vec<Validator>,
    pub context: ContextSpec,
}

/// Per-iteration context handed to a scenario body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioContext {
    pub task_id: String,
    pub iteration: usize,
    /// Index of the user assigned to this iteration, if any users exist
    pub user_index: Option<usize>,
}

impl ScenarioContext {
    /// Context for `iteration`, picking users round-robin.
    pub fn for_iteration(task_id: impl Into<String>, iteration: usize, user_count: usize) -> Self {
        Self {
            task_id: task_id.into(),
            iteration,
            user_index: (user_count > 0).then(|| iteration % user_count),
        }
    }

    /// Short task prefix used in generated resource names.
    pub fn task_prefix(&self) -> &str {
        let end = self
            .task_id
            .char_indices()
            .nth(8)
            .map_or(self.task_id.len(), |(idx, _)| idx);
        &self.task_id[..end]
    }
}

/// A benchmark scenario runnable against environment `E`.
pub trait Scenario<E: Sync>: Send + Sync {
    /// Registration metadata.
    fn info(&self) -> &ScenarioInfo;

    /// Checks that `args` decode into the scenario's argument type.
    ///
    /// Called once per workload before any iteration runs.
    fn check_args(&self, _args: &ScenarioArgs) -> Result<(), ScenarioError> {
        Ok(())
    }

    /// Runs one iteration. Collaborator errors propagate unmodified.
    fn run(
        &self,
        env: &E,
        ctx: &ScenarioContext,
        args: &ScenarioArgs,
        actions: &AtomicActions,
    ) -> impl Future<Output = Result<(), BenchError>> + Send;
}

/// dyn-compatible twin of [`Scenario`].
pub trait DynScenario<E: Sync>: Send + Sync {
    fn info(&self) -> &ScenarioInfo;

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError>;

    fn run<'a>(
        &'a self,
        env: &'a E,
        ctx: &'a ScenarioContext,
        args: &'a ScenarioArgs,
        actions: &'a AtomicActions,
    ) -> BoxFuture<'a, Result<(), BenchError>>;
}

impl<E: Sync, T: Scenario<E>> DynScenario<E> for T {
    fn info(&self) -> &ScenarioInfo {
        Scenario::info(self)
    }

    fn check_args(&self, args: &ScenarioArgs) -> Result<(), ScenarioError> {
        Scenario::check_args(self, args)
    }

    fn run<'a>(
        &'a self,
        env: &'a E,
        ctx: &'a ScenarioContext,
        args: &'a ScenarioArgs,
        actions: &'a AtomicActions,
    ) -> BoxFuture<'a, Result<(), BenchError>> {
        Box::pin(Scenario::run(self, env, ctx, args, actions))
    }
}

/// Decodes raw arguments into a scenario's typed argument struct.
pub fn decode_args<T: DeserializeOwned>(
    scenario: &str,
    args: &ScenarioArgs,
) -> Result<T, ScenarioError> {
    serde_json::from_value(serde_json::Value::Object(args.clone())).map_err(|e| {
        ScenarioError::InvalidArgs {
            scenario: scenario.to_owned(),
            reason: e.to_string(),
        }
    })
}

/// Scenarios keyed by registered name, in registration order.
pub struct ScenarioRegistry<E: Sync> {
    scenarios: Vec<Box<dyn DynScenario<E>>>,
}

impl<E: Sync> ScenarioRegistry<E> {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }

    /// Registers a scenario. Duplicate names are rejected.
    pub fn register(&mut self, scenario: Box<dyn DynScenario<E>>) -> Result<(), ScenarioError> {
        let name = scenario.info().name.clone();
        if self.scenarios.iter().any(|s| s.info().name == name) {
            return Err(ScenarioError::AlreadyRegistered { name });
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynScenario<E>> {
        self.scenarios
            .iter()
            .find(|s| s.info().name == name)
            .map(|s| s.as_ref())
    }

    /// Like [`get`](Self::get) but with a `NotFound` error.
    pub fn require(&self, name: &str) -> Result<&dyn DynScenario<E>, ScenarioError> {
        self.get(name).ok_or_else(|| ScenarioError::NotFound {
            name: name.to_owned(),
        })
    }

    pub fn list(&self) -> Vec<&ScenarioInfo> {
        self.scenarios.iter().map(|s| s.info()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios
            .iter()
            .map(|s| s.info().name.as_str())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.scenarios.len()
    }
}

impl<E: Sync> Default for ScenarioRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
