//! Keystone v3 password authentication and catalog lookup.
//!
//! The request/response shapes and endpoint selection are plain functions so
//! they can be tested without a Keystone server; [`authenticate`] glues them
//! to reqwest.

use serde::{Deserialize, Serialize};
use tracing::debug;

use neutron_bench_core::config::CredentialConfig;

use crate::error::NeutronError;

/// Header carrying the issued token in the Keystone response.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Catalog service type of Neutron.
pub const NETWORK_SERVICE_TYPE: &str = "network";

/// Neutron API version path.
pub const NETWORK_API_VERSION: &str = "/v2.0";

// --- request body ---

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    auth: Auth<'a>,
}

#[derive(Debug, Serialize)]
struct Auth<'a> {
    identity: Identity<'a>,
    scope: Scope<'a>,
}

#[derive(Debug, Serialize)]
struct Identity<'a> {
    methods: [&'static str; 1],
    password: PasswordMethod<'a>,
}

#[derive(Debug, Serialize)]
struct PasswordMethod<'a> {
    user: PasswordUser<'a>,
}

#[derive(Debug, Serialize)]
struct PasswordUser<'a> {
    name: &'a str,
    domain: DomainName<'a>,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Scope<'a> {
    project: ProjectScope<'a>,
}

#[derive(Debug, Serialize)]
struct ProjectScope<'a> {
    name: &'a str,
    domain: DomainName<'a>,
}

#[derive(Debug, Serialize)]
struct DomainName<'a> {
    name: &'a str,
}

impl<'a> AuthRequest<'a> {
    /// Project-scoped password authentication for `cred`.
    pub fn password(cred: &'a CredentialConfig) -> Self {
        Self {
            auth: Auth {
                identity: Identity {
                    methods: ["password"],
                    password: PasswordMethod {
                        user: PasswordUser {
                            name: &cred.username,
                            domain: DomainName {
                                name: &cred.user_domain_name,
                            },
                            password: &cred.password,
                        },
                    },
                },
                scope: Scope {
                    project: ProjectScope {
                        name: &cred.project_name,
                        domain: DomainName {
                            name: &cred.project_domain_name,
                        },
                    },
                },
            },
        }
    }
}

// --- response body ---

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: TokenBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One service in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEndpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

impl CatalogEndpoint {
    fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region) || self.region_id.as_deref() == Some(region)
    }
}

/// A scoped token with its catalog.
#[derive(Clone)]
pub struct KeystoneSession {
    pub token: String,
    pub project_id: String,
    pub catalog: Vec<CatalogEntry>,
}

impl std::fmt::Debug for KeystoneSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoneSession")
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("catalog", &self.catalog.len())
            .finish()
    }
}

/// `POST` target for token issuance. Appends `/v3` when the URL lacks it.
pub fn tokens_url(auth_url: &str) -> String {
    let base = auth_url.trim_end_matches('/');
    if base.ends_with("/v3") {
        format!("{base}/auth/tokens")
    } else {
        format!("{base}/v3/auth/tokens")
    }
}

/// Picks the URL of `service_type` for `interface`, restricted to `region`
/// when it is non-empty. Entries sharing a service type are searched in
/// catalog order and the first matching endpoint wins.
pub fn select_endpoint(
    catalog: &[CatalogEntry],
    service_type: &str,
    interface: &str,
    region: &str,
) -> Result<String, NeutronError> {
    let mut entries = catalog
        .iter()
        .filter(|e| e.service_type == service_type)
        .peekable();
    if entries.peek().is_none() {
        return Err(NeutronError::EndpointNotFound(format!(
            "no '{service_type}' service in catalog"
        )));
    }

    entries
        .flat_map(|e| e.endpoints.iter())
        .filter(|ep| ep.interface == interface)
        .find(|ep| region.is_empty() || ep.in_region(region))
        .map(|ep| ep.url.clone())
        .ok_or_else(|| {
            NeutronError::EndpointNotFound(format!(
                "no {interface} endpoint for '{service_type}'{}",
                if region.is_empty() {
                    String::new()
                } else {
                    format!(" in region {region}")
                }
            ))
        })
}

/// Service types present in the catalog, deduplicated in catalog order.
pub fn catalog_service_types(catalog: &[CatalogEntry]) -> Vec<String> {
    let mut types: Vec<String> = Vec::with_capacity(catalog.len());
    for entry in catalog {
        if !types.contains(&entry.service_type) {
            types.push(entry.service_type.clone());
        }
    }
    types
}

/// Normalizes a Neutron endpoint to its versioned base URL.
pub fn network_base_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with(NETWORK_API_VERSION) {
        base.to_owned()
    } else {
        format!("{base}{NETWORK_API_VERSION}")
    }
}

/// Issues a project-scoped token for `cred`.
pub async fn authenticate(
    http: &reqwest::Client,
    auth_url: &str,
    cred: &CredentialConfig,
) -> Result<KeystoneSession, NeutronError> {
    let url = tokens_url(auth_url);
    debug!(url = %url, username = %cred.username, project = %cred.project_name, "requesting keystone token");

    let response = http
        .post(&url)
        .json(&AuthRequest::password(cred))
        .send()
        .await
        .map_err(|e| NeutronError::Transport(format!("keystone request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NeutronError::Auth(format!(
            "status {} for user '{}': {}",
            status.as_u16(),
            cred.username,
            crate::http::error_message(&body)
        )));
    }

    let token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| NeutronError::Auth(format!("no {SUBJECT_TOKEN_HEADER} header in response")))?;

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| NeutronError::Decode(format!("keystone token body: {e}")))?;

    let project_id = body
        .token
        .project
        .map(|p| p.id)
        .ok_or_else(|| NeutronError::Auth("token is not project scoped".to_owned()))?;

    Ok(KeystoneSession {
        token,
        project_id,
        catalog: body.token.catalog,
    })
}
