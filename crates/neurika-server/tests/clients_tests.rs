//! Outbound HTTP clients against wiremock
//!
//! Covers the identity lookup, the OpenAI-compatible completion client and
//! the invitation mailer.

use neurika_common::types::TeamRole;
use neurika_server::{
    auth::IdentityClient,
    config::{AuthConfig, CompletionConfig, MailConfig},
    error::AppError,
    llm::{CompletionError, CompletionProvider, CompletionRequest, Message, OpenAiClient},
    mail::{Invitation, MailError, Mailer, INVITATION_SUBJECT},
};
use serde_json::json;
use uuid::Uuid;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Identity
// ============================================================================

fn identity_client(server: &MockServer, api_key: Option<&str>) -> IdentityClient {
    IdentityClient::new(
        reqwest::Client::new(),
        &AuthConfig {
            url: format!("{}/", server.uri()),
            api_key: api_key.map(String::from),
        },
    )
}

#[tokio::test]
async fn test_identity_resolves_user_and_lowercases_email() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer t0ken"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user_id,
            "email": "Ana@Example.COM",
            "aud": "authenticated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = identity_client(&server, Some("anon-key"))
        .resolve("t0ken")
        .await
        .unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.email.as_deref(), Some("ana@example.com"));
}

#[tokio::test]
async fn test_identity_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = identity_client(&server, None).resolve("expired").await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_identity_malformed_payload_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "nope" })))
        .mount(&server)
        .await;

    let result = identity_client(&server, None).resolve("t").await;
    assert!(matches!(result, Err(AppError::Identity(_))));
}

// ============================================================================
// Completion
// ============================================================================

fn completion_client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        reqwest::Client::new(),
        &CompletionConfig {
            api_key: "sk-test".into(),
            base_url: server.uri(),
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 1000,
        },
    )
}

fn request(json_mode: bool) -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::system("You are an analyst"), Message::user("Total sales?")],
        json_mode,
    }
}

#[tokio::test]
async fn test_completion_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": "You are an analyst" },
                { "role": "user", "content": "Total sales?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"answer\":\"42\"}" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = completion_client(&server).complete(request(true)).await.unwrap();
    assert_eq!(content, "{\"answer\":\"42\"}");
}

#[tokio::test]
async fn test_completion_api_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = completion_client(&server)
        .complete(request(false))
        .await
        .unwrap_err();

    match err {
        CompletionError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        },
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_completion_without_choices_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = completion_client(&server)
        .complete(request(false))
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}

// ============================================================================
// Mail
// ============================================================================

fn mailer(server: &MockServer) -> Mailer {
    Mailer::from_config(
        reqwest::Client::new(),
        &MailConfig {
            resend_api_key: Some("re_test".into()),
            resend_base_url: server.uri(),
            from: "Neurika <onboarding@resend.dev>".into(),
            app_base_url: "https://app.neurika.test".into(),
        },
    )
    .expect("mailer configured")
}

#[tokio::test]
async fn test_invitation_email_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test"))
        .and(body_partial_json(json!({
            "to": ["new@example.com"],
            "subject": INVITATION_SUBJECT
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_1" })))
        .expect(1)
        .mount(&server)
        .await;

    mailer(&server)
        .send_invitation(&Invitation {
            email: "new@example.com",
            role: TeamRole::Reader,
            token: Uuid::new_v4(),
            message: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invitation_email_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
        .mount(&server)
        .await;

    let err = mailer(&server)
        .send_invitation(&Invitation {
            email: "new@example.com",
            role: TeamRole::Admin,
            token: Uuid::new_v4(),
            message: Some("hi"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MailError::Api { status: 422, .. }));
}
