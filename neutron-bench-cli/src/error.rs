//! CLI-specific error types and exit code mapping

use neutron_bench_core::error::BenchError;
use neutron_bench_neutron::NeutronError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// At least one workload was rejected by its validators.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// At least one iteration failed.
    #[error("iterations failed: {0}")]
    IterationsFailed(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped framework error from neutron-bench-core.
    #[error("{0}")]
    Bench(#[from] BenchError),

    /// Neutron or Keystone failure outside a scenario (connect, discovery).
    #[error("{0}")]
    Neutron(#[from] NeutronError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 3    | Workload validation failed       |
    /// | 4    | One or more iterations failed    |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::ValidationFailed(_) => 3,
            Self::IterationsFailed(_) => 4,
            Self::Io(_) => 10,
            Self::Bench(BenchError::Config(_)) => 2,
            Self::Bench(BenchError::Io(_)) => 10,
            Self::Neutron(NeutronError::Config(_)) => 2,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Bench(_) | Self::Neutron(_) => 1,
        }
    }
}
