//! Scenario framework for neutron-bench.
//!
//! # Module Structure
//!
//! - [`error`]: Error types (`BenchError` and per-concern enums)
//! - [`config`]: `neutron-bench.toml` loading (`BenchConfig`)
//! - [`task`]: Task files (`TaskFile`, `Workload`)
//! - [`validation`]: Declared preconditions (`Validator`, `PlatformFacts`, `validate`)
//! - [`atomic`]: Per-call timing (`AtomicActions`)
//! - [`scenario`]: `Scenario` trait, metadata and `ScenarioRegistry`
//! - [`runner`]: Sequential workload runner (`Runner`, `WorkloadReport`)
//! - [`metrics`]: Metric names
//!
//! # Flow
//!
//! ```text
//! TaskFile ──> Runner.run_workload()
//!                  │
//!             validate(info, args, facts)
//!                  │
//!             Scenario.run() x times ──> AtomicActions.timed(..) ──> client
//!                  │
//!             WorkloadReport
//! ```

pub mod atomic;
pub mod config;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod task;
pub mod validation;

// --- re-exports ---

pub use error::{BenchError, ClientError, ConfigError, ScenarioError, ValidationError};

pub use config::{BenchConfig, CredentialConfig, GeneralConfig, OpenStackConfig};

pub use task::{TaskFile, Workload};

pub use validation::{PLATFORM_OPENSTACK, PlatformFacts, Service, Validator, validate};

pub use atomic::{AtomicAction, AtomicActions};

pub use scenario::{
    BoxFuture, ContextSpec, DynScenario, Scenario, ScenarioArgs, ScenarioContext, ScenarioInfo,
    ScenarioRegistry, decode_args,
};

pub use runner::{IterationResult, Runner, WorkloadReport, generate_task_id};
