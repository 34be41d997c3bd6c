//! Error types, one enum per concern.
//!
//! [`BenchError`] is the top-level error every scenario returns. Domain
//! crates convert their own errors into it (usually into [`ClientError`])
//! so that `?` propagates collaborator failures unmodified to the runner.

/// Top-level neutron-bench error.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Configuration or task file problem.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Scenario preconditions were not met.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Scenario lookup, arguments or in-scenario assertion.
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Failure reported by the cloud API collaborator.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration could not be parsed.
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// A field holds an invalid value.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Precondition validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// One or more validators rejected the workload.
    #[error("scenario '{scenario}' failed validation: {}", failures.join("; "))]
    Failed {
        /// Registered scenario name.
        scenario: String,
        /// One message per failing validator.
        failures: Vec<String>,
    },
}

/// Scenario registry and execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// No scenario registered under this name.
    #[error("scenario not found: {name}")]
    NotFound { name: String },

    /// A scenario with the same name is already registered.
    #[error("scenario already registered: {name}")]
    AlreadyRegistered { name: String },

    /// Scenario arguments could not be decoded.
    #[error("invalid arguments for '{scenario}': {reason}")]
    InvalidArgs { scenario: String, reason: String },

    /// An in-scenario check did not hold.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    /// The scenario needs a user context but none is configured.
    #[error("no user context available for iteration {iteration}")]
    NoUserContext { iteration: usize },

    /// The scenario needs admin credentials but none are configured.
    #[error("no admin context available")]
    NoAdminContext,
}

/// Errors surfaced by an API collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Authentication against the identity service failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Requested resource does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The API answered with a non-success status.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}
