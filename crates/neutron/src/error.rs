//! Neutron collaborator errors.
//!
//! [`NeutronError`] covers authentication, transport and API failures.
//! `From<NeutronError> for BenchError` lets scenario bodies propagate them
//! with `?`.

use neutron_bench_core::error::{BenchError, ClientError};

#[derive(Debug, thiserror::Error)]
pub enum NeutronError {
    /// Keystone rejected the credentials or returned no token.
    #[error("keystone authentication failed: {0}")]
    Auth(String),

    /// The catalog has no usable network endpoint.
    #[error("network endpoint not found: {0}")]
    EndpointNotFound(String),

    /// 404 from Neutron.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Any other non-success response.
    #[error("neutron api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS or timeout failure.
    #[error("neutron transport error: {0}")]
    Transport(String),

    /// Unexpected response body.
    #[error("neutron response decode error: {0}")]
    Decode(String),

    /// Rejected before sending (e.g. malformed resource id).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Client construction problem.
    #[error("neutron client config error: {0}")]
    Config(String),
}

impl From<NeutronError> for BenchError {
    fn from(err: NeutronError) -> Self {
        match err {
            NeutronError::Auth(msg) => BenchError::Client(ClientError::Auth(msg)),
            NeutronError::NotFound { resource, id } => {
                BenchError::Client(ClientError::NotFound { resource, id })
            }
            NeutronError::Api { status, message } => {
                BenchError::Client(ClientError::Api { status, message })
            }
            NeutronError::Decode(msg) => BenchError::Client(ClientError::Decode(msg)),
            NeutronError::Transport(_)
            | NeutronError::EndpointNotFound(_)
            | NeutronError::InvalidRequest(_)
            | NeutronError::Config(_) => {
                BenchError::Client(ClientError::Transport(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = NeutronError::NotFound {
            resource: "bgpvpn".to_owned(),
            id: "abc".to_owned(),
        };
        assert_eq!(err.to_string(), "bgpvpn not found: abc");
    }

    #[test]
    fn api_error_keeps_status_through_conversion() {
        let err: BenchError = NeutronError::Api {
            status: 403,
            message: "forbidden".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            BenchError::Client(ClientError::Api { status: 403, .. })
        ));
    }

    #[test]
    fn auth_error_converts_to_client_auth() {
        let err: BenchError = NeutronError::Auth("401".to_owned()).into();
        assert!(matches!(err, BenchError::Client(ClientError::Auth(_))));
    }

    #[test]
    fn invalid_request_converts_with_context() {
        let err: BenchError = NeutronError::InvalidRequest("bad id".to_owned()).into();
        assert!(err.to_string().contains("bad id"));
    }
}
