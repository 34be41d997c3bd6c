//! Precondition validators.
//!
//! Scenarios declare a list of [`Validator`]s in their [`ScenarioInfo`].
//! [`validate`] evaluates all of them against the workload arguments and the
//! [`PlatformFacts`] discovered once per task, before any iteration runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scenario::{ScenarioArgs, ScenarioInfo};

/// Platform name of an OpenStack deployment.
pub const PLATFORM_OPENSTACK: &str = "openstack";

/// Cloud services a scenario can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Neutron,
    Keystone,
}

impl Service {
    /// Service type as it appears in the Keystone catalog.
    pub fn catalog_type(&self) -> &'static str {
        match self {
            Self::Neutron => "network",
            Self::Keystone => "identity",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutron => write!(f, "neutron"),
            Self::Keystone => write!(f, "keystone"),
        }
    }
}

/// A declared precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Argument `param` must be one of `values`; `missed` allows it to be absent.
    Enum {
        param: String,
        values: Vec<String>,
        missed: bool,
    },
    /// Neutron must advertise every listed extension alias.
    RequiredNeutronExtensions { extensions: Vec<String> },
    /// Every listed service must be in the catalog.
    RequiredServices { services: Vec<Service> },
    /// Platform must match and provide admin and/or user credentials.
    RequiredPlatform {
        platform: String,
        admin: bool,
        users: bool,
    },
}

impl Validator {
    /// Checks this validator, returning a message on failure.
    pub fn check(&self, args: &ScenarioArgs, facts: &PlatformFacts) -> Result<(), String> {
        match self {
            Self::Enum {
                param,
                values,
                missed,
            } => match args.get(param) {
                None if *missed => Ok(()),
                None => Err(format!("parameter '{param}' is required")),
                Some(value) => match value.as_str() {
                    Some(v) if values.iter().any(|allowed| allowed == v) => Ok(()),
                    _ => Err(format!(
                        "parameter '{param}' must be one of: {} (got {value})",
                        values.join(", ")
                    )),
                },
            },
            Self::RequiredNeutronExtensions { extensions } => {
                let missing: Vec<&str> = extensions
                    .iter()
                    .filter(|ext| !facts.neutron_extensions.contains(ext))
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(format!(
                        "neutron extensions not available: {}",
                        missing.join(", ")
                    ))
                }
            }
            Self::RequiredServices { services } => {
                let missing: Vec<String> = services
                    .iter()
                    .filter(|svc| !facts.services.iter().any(|s| s == svc.catalog_type()))
                    .map(ToString::to_string)
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(format!("required services missing: {}", missing.join(", ")))
                }
            }
            Self::RequiredPlatform {
                platform,
                admin,
                users,
            } => {
                if &facts.platform != platform {
                    return Err(format!(
                        "platform '{platform}' required, found '{}'",
                        facts.platform
                    ));
                }
                if *admin && !facts.has_admin {
                    return Err(format!("platform '{platform}' requires admin credentials"));
                }
                if *users && facts.user_count == 0 {
                    return Err(format!("platform '{platform}' requires at least one user"));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum {
                param,
                values,
                missed,
            } => write!(
                f,
                "enum({param} in [{}]{})",
                values.join(", "),
                if *missed { ", optional" } else { "" }
            ),
            Self::RequiredNeutronExtensions { extensions } => {
                write!(f, "required_neutron_extensions([{}])", extensions.join(", "))
            }
            Self::RequiredServices { services } => {
                let names: Vec<String> = services.iter().map(ToString::to_string).collect();
                write!(f, "required_services([{}])", names.join(", "))
            }
            Self::RequiredPlatform {
                platform,
                admin,
                users,
            } => write!(f, "required_platform({platform}, admin={admin}, users={users})"),
        }
    }
}

/// What the target deployment offers, discovered once per task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFacts {
    pub platform: String,
    pub has_admin: bool,
    pub user_count: usize,
    /// Catalog service types (`network`, `identity`, ...)
    pub services: Vec<String>,
    /// Neutron extension aliases
    pub neutron_extensions: Vec<String>,
}

/// Runs every validator of `info`, collecting all failures.
pub fn validate(
    info: &ScenarioInfo,
    args: &ScenarioArgs,
    facts: &PlatformFacts,
) -> Result<(), ValidationError> {
    let failures: Vec<String> = info
        .validators
        .iter()
        .filter_map(|v| v.check(args, facts).err())
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Failed {
            scenario: info.name.clone(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ContextSpec;
    use serde_json::json;

    fn bgpvpn_type_enum() -> Validator {
        Validator::Enum {
            param: "bgpvpn_type".to_owned(),
            values: vec!["l2".to_owned(), "l3".to_owned()],
            missed: true,
        }
    }

    fn openstack_facts() -> PlatformFacts {
        PlatformFacts {
            platform: PLATFORM_OPENSTACK.to_owned(),
            has_admin: true,
            user_count: 2,
            services: vec!["network".to_owned(), "identity".to_owned()],
            neutron_extensions: vec!["router".to_owned(), "bgpvpn".to_owned()],
        }
    }

    fn args(value: serde_json::Value) -> ScenarioArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn enum_accepts_listed_values() {
        let v = bgpvpn_type_enum();
        let facts = openstack_facts();
        assert!(v.check(&args(json!({"bgpvpn_type": "l2"})), &facts).is_ok());
        assert!(v.check(&args(json!({"bgpvpn_type": "l3"})), &facts).is_ok());
    }

    #[test]
    fn enum_rejects_unlisted_value() {
        let err = bgpvpn_type_enum()
            .check(&args(json!({"bgpvpn_type": "l4"})), &openstack_facts())
            .unwrap_err();
        assert!(err.contains("bgpvpn_type"));
        assert!(err.contains("l4"));
    }

    #[test]
    fn enum_rejects_non_string_value() {
        let result =
            bgpvpn_type_enum().check(&args(json!({"bgpvpn_type": 3})), &openstack_facts());
        assert!(result.is_err());
    }

    #[test]
    fn enum_missing_param_depends_on_missed_flag() {
        let facts = openstack_facts();
        assert!(bgpvpn_type_enum().check(&ScenarioArgs::new(), &facts).is_ok());

        let strict = Validator::Enum {
            param: "bgpvpn_type".to_owned(),
            values: vec!["l2".to_owned()],
            missed: false,
        };
        let err = strict.check(&ScenarioArgs::new(), &facts).unwrap_err();
        assert!(err.contains("required"));
    }

    #[test]
    fn extensions_validator_lists_missing_aliases() {
        let v = Validator::RequiredNeutronExtensions {
            extensions: vec!["bgpvpn".to_owned(), "bgpvpn-routes-control".to_owned()],
        };
        let err = v.check(&ScenarioArgs::new(), &openstack_facts()).unwrap_err();
        assert!(err.contains("bgpvpn-routes-control"));
        assert!(!err.contains("bgpvpn,"));
    }

    #[test]
    fn services_validator_uses_catalog_type() {
        let v = Validator::RequiredServices {
            services: vec![Service::Neutron],
        };
        assert!(v.check(&ScenarioArgs::new(), &openstack_facts()).is_ok());

        let mut facts = openstack_facts();
        facts.services = vec!["identity".to_owned()];
        let err = v.check(&ScenarioArgs::new(), &facts).unwrap_err();
        assert!(err.contains("neutron"));
    }

    #[test]
    fn platform_validator_checks_admin_and_users() {
        let v = Validator::RequiredPlatform {
            platform: PLATFORM_OPENSTACK.to_owned(),
            admin: true,
            users: true,
        };
        assert!(v.check(&ScenarioArgs::new(), &openstack_facts()).is_ok());

        let mut facts = openstack_facts();
        facts.user_count = 0;
        assert!(v.check(&ScenarioArgs::new(), &facts).unwrap_err().contains("user"));

        let mut facts = openstack_facts();
        facts.has_admin = false;
        assert!(v.check(&ScenarioArgs::new(), &facts).unwrap_err().contains("admin"));

        let mut facts = openstack_facts();
        facts.platform = "kubernetes".to_owned();
        assert!(v.check(&ScenarioArgs::new(), &facts).is_err());
    }

    #[test]
    fn validate_collects_all_failures() {
        let info = ScenarioInfo {
            name: "NeutronBGPVPN.create_and_delete_bgpvpns".to_owned(),
            description: String::new(),
            validators: vec![
                bgpvpn_type_enum(),
                Validator::RequiredNeutronExtensions {
                    extensions: vec!["bgpvpn".to_owned()],
                },
            ],
            context: ContextSpec::default(),
        };
        let mut facts = openstack_facts();
        facts.neutron_extensions.clear();

        let err = validate(&info, &args(json!({"bgpvpn_type": "vpls"})), &facts).unwrap_err();
        let ValidationError::Failed { scenario, failures } = err;
        assert_eq!(scenario, "NeutronBGPVPN.create_and_delete_bgpvpns");
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn validator_display_is_readable() {
        assert_eq!(
            bgpvpn_type_enum().to_string(),
            "enum(bgpvpn_type in [l2, l3], optional)"
        );
    }
}
