//! Credential providers against mock identity endpoints.
//!
//! Run: cargo nextest run --test credential_tests

use std::sync::Arc;

use azure_pipeline::auth::{
    CachingCredential, ChainCredential, ClientSecretCredential, ManagedIdentityCredential,
    StaticTokenCredential, TokenCredential,
};
use azure_pipeline::{AzureEnvironment, AzureTokenCredentials, Error};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARM: &str = "https://management.core.windows.net/";

fn client_secret(server: &MockServer) -> ClientSecretCredential {
    ClientSecretCredential::with_client(
        "test-tenant",
        "test-client",
        "test-secret",
        server.uri(),
        reqwest::Client::new(),
    )
}

// =============================================================================
// Client secret
// =============================================================================

mod client_secret_tests {
    use super::*;

    #[tokio::test]
    async fn test_token_request_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test-tenant/oauth2/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=test-client"))
            .and(body_string_contains("client_secret=test-secret"))
            .and(body_string_contains(
                "resource=https%3A%2F%2Fmanagement.core.windows.net%2F",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-access-token",
                "token_type": "Bearer",
                "expires_in": "3599"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_secret(&server).get_token(ARM).await.unwrap();

        assert_eq!(token.secret(), "mock-access-token");
        assert!(token.expires_at().is_some());
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn test_error_response_maps_to_token_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let err = client_secret(&server).get_token(ARM).await.unwrap_err();

        match err {
            Error::TokenRequest { status, ref message } => {
                assert_eq!(status, 401);
                assert!(message.contains("AADSTS7000215"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_authorization_error());
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = client_secret(&server).get_token(ARM).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_caching_wrapper_hits_endpoint_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "cached",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = CachingCredential::new(Arc::new(client_secret(&server)));
        for _ in 0..3 {
            assert_eq!(credential.get_token(ARM).await.unwrap().secret(), "cached");
        }
    }
}

// =============================================================================
// Managed identity
// =============================================================================

mod managed_identity_tests {
    use super::*;

    #[tokio::test]
    async fn test_imds_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/identity/oauth2/token"))
            .and(query_param("api-version", "2018-02-01"))
            .and(query_param("resource", "https://vault.azure.net/"))
            .and(header("Metadata", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-managed-identity-token",
                "token_type": "Bearer",
                "expires_on": "9999999999"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = ManagedIdentityCredential::with_client(reqwest::Client::new())
            .with_endpoint(format!("{}/metadata/identity/oauth2/token", server.uri()));
        let token = credential
            .get_token("https://vault.azure.net/")
            .await
            .unwrap();

        assert_eq!(token.secret(), "mock-managed-identity-token");
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn test_user_assigned_identity_sends_client_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("client_id", "user-assigned"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ua-token",
                "expires_on": 9999999999u64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = ManagedIdentityCredential::with_client(reqwest::Client::new())
            .with_endpoint(server.uri())
            .with_client_id("user-assigned");
        let token = credential.get_token(ARM).await.unwrap();
        assert_eq!(token.secret(), "ua-token");
    }
}

// =============================================================================
// Chain and environment binding
// =============================================================================

mod chain_tests {
    use super::*;

    #[tokio::test]
    async fn test_chain_falls_back_past_failing_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_request"
            })))
            .mount(&server)
            .await;

        let chain = ChainCredential::default()
            .with(client_secret(&server))
            .with(StaticTokenCredential::new("fallback"));

        let token = chain.get_token(ARM).await.unwrap();
        assert_eq!(token.secret(), "fallback");
    }

    #[tokio::test]
    async fn test_chain_aggregates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_request"
            })))
            .mount(&server)
            .await;

        let chain = ChainCredential::default().with(client_secret(&server));
        let err = chain.get_token(ARM).await.unwrap_err();

        assert!(matches!(err, Error::Auth { .. }));
        assert!(err.to_string().contains("client_secret"));
        assert!(err.to_string().contains("invalid_request"));
    }

    #[tokio::test]
    async fn test_azure_credentials_request_resolved_audience() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("resource=https%3A%2F%2Fvault.azure.net%2F"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "kv-token",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials =
            AzureTokenCredentials::new(Arc::new(client_secret(&server)), AzureEnvironment::azure());
        let url = url::Url::parse("https://myvault.vault.azure.net/secrets/db").unwrap();

        assert_eq!(
            credentials.authorization_header_value(&url).await.unwrap(),
            "Bearer kv-token"
        );
    }
}
