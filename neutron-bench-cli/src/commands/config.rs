//! `neutron-bench config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use neutron_bench_core::config::BenchConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
const SECTIONS: [&str; 2] = ["general", "openstack"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration, reporting the outcome.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, malformed or invalid.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match BenchConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = BenchConfig::load(config_path).await?;
    redact_credentials(&mut config);

    let report = build_report(&config, config_path, section)?;
    writer.render(&report)?;

    Ok(())
}

fn build_report(
    config: &BenchConfig,
    config_path: &Path,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let (config_toml, config_value) = match section.as_deref() {
        None => serialize_section(config)?,
        Some("general") => serialize_section(&config.general)?,
        Some("openstack") => serialize_section(&config.openstack)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section,
        config: config_value,
        config_toml,
    })
}

/// TOML text for the terminal, a JSON value for `--output json`.
fn serialize_section<T: Serialize>(value: &T) -> Result<(String, serde_json::Value), CliError> {
    let text = toml::to_string_pretty(value)
        .map_err(|e| CliError::Command(format!("failed to serialize config: {}", e)))?;
    Ok((text, serde_json::to_value(value)?))
}

/// Replace every password with a placeholder.
fn redact_credentials(config: &mut BenchConfig) {
    let os = &mut config.openstack;
    if let Some(admin) = os.admin.as_mut() {
        *admin = admin.redacted();
    }
    for user in &mut os.users {
        *user = user.redacted();
    }
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering; JSON output carries
/// the same (redacted) values in `config`.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    /// None = full config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: serde_json::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty if valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_bench_core::config::CredentialConfig;

    fn config_with_credentials() -> BenchConfig {
        let mut config = BenchConfig::default();
        config.openstack.auth_url = "https://keystone.example.com:5000/v3".to_owned();
        config.openstack.admin = Some(CredentialConfig {
            username: "admin".to_owned(),
            password: "admin-secret".to_owned(),
            project_name: "admin".to_owned(),
            ..CredentialConfig::default()
        });
        config.openstack.users = vec![CredentialConfig {
            username: "demo".to_owned(),
            password: "demo-secret".to_owned(),
            project_name: "demo".to_owned(),
            ..CredentialConfig::default()
        }];
        config
    }

    fn render(payload: &impl Render) -> String {
        let mut buffer = Vec::new();
        payload
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_redact_credentials_hides_every_password() {
        let mut config = config_with_credentials();
        redact_credentials(&mut config);

        let report = build_report(&config, Path::new("neutron-bench.toml"), None)
            .expect("full report");
        assert!(!report.config_toml.contains("admin-secret"));
        assert!(!report.config_toml.contains("demo-secret"));
        assert!(report.config_toml.contains("***REDACTED***"));
        assert!(report.config_toml.contains("username = \"demo\""));
    }

    #[test]
    fn test_build_report_single_section() {
        let config = config_with_credentials();
        let report = build_report(
            &config,
            Path::new("neutron-bench.toml"),
            Some("general".to_owned()),
        )
        .expect("general section");
        assert_eq!(report.section.as_deref(), Some("general"));
        assert!(report.config_toml.contains("log_level"));
        assert!(!report.config_toml.contains("auth_url"));
    }

    #[test]
    fn test_build_report_unknown_section_fails() {
        let config = BenchConfig::default();
        let err = build_report(&config, Path::new("x.toml"), Some("ebpf".to_owned()))
            .err()
            .expect("unknown section should fail");
        assert!(matches!(err, CliError::Command(_)));
        assert!(err.to_string().contains("general, openstack"));
    }

    #[test]
    fn test_config_report_render_text_specific_section() {
        let report = ConfigReport {
            source: "/etc/neutron-bench.toml".to_owned(),
            section: Some("openstack".to_owned()),
            config: serde_json::json!({"auth_url": "https://keystone:5000/v3"}),
            config_toml: "auth_url = \"https://keystone:5000/v3\"".to_owned(),
        };

        let output = render(&report);
        assert!(output.contains("[openstack]"), "should show section name");
        assert!(output.contains("auth_url"), "should show config content");
    }

    #[test]
    fn test_config_report_json_carries_redacted_values() {
        let mut config = config_with_credentials();
        redact_credentials(&mut config);

        let report = build_report(&config, Path::new("test.toml"), None).expect("full report");
        let parsed = serde_json::to_value(&report).expect("JSON serialization should succeed");

        assert_eq!(parsed["source"].as_str(), Some("test.toml"));
        assert!(parsed.get("section").is_none());
        assert!(parsed.get("config_toml").is_none());
        assert_eq!(
            parsed["config"]["openstack"]["auth_url"].as_str(),
            Some("https://keystone.example.com:5000/v3")
        );
        assert_eq!(
            parsed["config"]["openstack"]["admin"]["password"].as_str(),
            Some("***REDACTED***")
        );
        assert_eq!(
            parsed["config"]["openstack"]["users"][0]["username"].as_str(),
            Some("demo")
        );
        let text = parsed.to_string();
        assert!(!text.contains("admin-secret"));
        assert!(!text.contains("demo-secret"));
    }

    #[test]
    fn test_config_report_json_single_section() {
        let config = config_with_credentials();
        let report = build_report(
            &config,
            Path::new("neutron-bench.toml"),
            Some("general".to_owned()),
        )
        .expect("general section");
        let parsed = serde_json::to_value(&report).expect("json");

        assert_eq!(parsed["section"].as_str(), Some("general"));
        assert!(parsed["config"]["log_level"].is_string());
        assert!(parsed["config"].get("openstack").is_none());
    }

    #[test]
    fn test_config_validation_report_valid() {
        let report = ConfigValidationReport {
            source: "neutron-bench.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };

        let output = render(&report);
        assert!(output.contains("VALID"));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn test_config_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'openstack.auth_url'".to_owned()],
        };

        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("openstack.auth_url"));

        let parsed = serde_json::to_value(&report).expect("json");
        assert_eq!(parsed["valid"].as_bool(), Some(false));
        assert_eq!(parsed["errors"].as_array().map(Vec::len), Some(1));
    }
}
