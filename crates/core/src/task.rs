//! Task files: which scenarios to run, how often, with which arguments.
//!
//! ```toml
//! [[workload]]
//! scenario = "NeutronBGPVPN.create_and_list_bgpvpns"
//! times = 3
//!
//! [workload.args]
//! route_targets = ["64512:1"]
//! bgpvpn_type = "l3"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, ConfigError};
use crate::scenario::ScenarioArgs;

/// A parsed task file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default, rename = "workload")]
    pub workloads: Vec<Workload>,
}

/// One scenario invocation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workload {
    /// Registered scenario name
    pub scenario: String,
    /// Number of sequential iterations
    #[serde(default = "default_times")]
    pub times: usize,
    /// Scenario arguments, decoded by the scenario itself
    #[serde(default)]
    pub args: ScenarioArgs,
}

fn default_times() -> usize {
    1
}

impl TaskFile {
    /// Reads and validates a task file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BenchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BenchError::Io(e)
            }
        })?;
        let task = Self::parse(&content)?;
        task.validate()?;
        Ok(task)
    }

    /// Parses a TOML task definition.
    pub fn parse(toml_str: &str) -> Result<Self, BenchError> {
        toml::from_str(toml_str).map_err(|e| {
            BenchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.workloads.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "workload".to_owned(),
                reason: "task must define at least one workload".to_owned(),
            }
            .into());
        }
        for (idx, workload) in self.workloads.iter().enumerate() {
            if workload.scenario.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("workload[{idx}].scenario"),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
            if workload.times == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("workload[{idx}].times"),
                    reason: "must be at least 1".to_owned(),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_workloads_with_args() {
        let task = TaskFile::parse(
            r#"
[[workload]]
scenario = "NeutronBGPVPN.create_and_list_bgpvpns"
times = 3

[workload.args]
route_targets = ["64512:1", "64512:2"]
bgpvpn_type = "l2"

[[workload]]
scenario = "NeutronBGPVPN.create_and_delete_bgpvpns"
"#,
        )
        .unwrap();
        task.validate().unwrap();

        assert_eq!(task.workloads.len(), 2);
        let first = &task.workloads[0];
        assert_eq!(first.times, 3);
        assert_eq!(first.args["bgpvpn_type"], "l2");
        assert_eq!(first.args["route_targets"][1], "64512:2");

        let second = &task.workloads[1];
        assert_eq!(second.times, 1);
        assert!(second.args.is_empty());
    }

    #[test]
    fn validate_rejects_empty_task() {
        let err = TaskFile::parse("").unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("at least one workload"));
    }

    #[test]
    fn validate_rejects_zero_times() {
        let task = TaskFile::parse(
            r#"
[[workload]]
scenario = "NeutronBGPVPN.create_and_delete_bgpvpns"
times = 0
"#,
        )
        .unwrap();
        let err = task.validate().unwrap_err();
        assert!(err.to_string().contains("workload[0].times"));
    }

    #[test]
    fn parse_rejects_missing_scenario_name() {
        let result = TaskFile::parse("[[workload]]\ntimes = 2\n");
        assert!(matches!(
            result,
            Err(BenchError::Config(ConfigError::ParseFailed { .. }))
        ));
    }
}
