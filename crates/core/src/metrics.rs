//! Metric names and labels.
//!
//! Recorded through the `metrics` facade (`histogram!`, `counter!`). The
//! binary does not install an exporter; embedders that want the numbers
//! install their own recorder.
//!
//! # Naming
//!
//! - prefix: `neutron_bench_`
//! - suffix: `_total` (counter), `_seconds` (histogram)

/// Atomic action name label key (e.g. `neutron.create_bgpvpn`)
pub const LABEL_ACTION: &str = "action";

/// Registered scenario name label key
pub const LABEL_SCENARIO: &str = "scenario";

/// Iteration outcome label key (success, failure)
pub const LABEL_RESULT: &str = "result";

/// Atomic action duration (histogram, seconds, label: action)
pub const ATOMIC_ACTION_DURATION_SECONDS: &str = "neutron_bench_atomic_action_duration_seconds";

/// Failed atomic actions (counter, label: action)
pub const ATOMIC_ACTION_FAILURES_TOTAL: &str = "neutron_bench_atomic_action_failures_total";

/// Finished iterations (counter, labels: scenario, result)
pub const ITERATIONS_TOTAL: &str = "neutron_bench_iterations_total";

/// Full iteration duration (histogram, seconds, label: scenario)
pub const ITERATION_DURATION_SECONDS: &str = "neutron_bench_iteration_duration_seconds";

/// Workloads rejected by precondition validation (counter, label: scenario)
pub const VALIDATION_FAILURES_TOTAL: &str = "neutron_bench_validation_failures_total";
