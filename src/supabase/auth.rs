//! GoTrue REST calls behind [`IdentityBackend`] and [`HealthProbe`].

use super::{
    backend::{HealthProbe, IdentityBackend, User},
    client::SupabaseClient,
    error::BackendError,
};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, instrument};

const USER_PATH: &str = "auth/v1/user";
const ADMIN_USERS_PATH: &str = "auth/v1/admin/users";
const HEALTH_PATH: &str = "auth/v1/health";

#[async_trait]
impl IdentityBackend for SupabaseClient {
    #[instrument(skip_all)]
    async fn get_user(&self, token: &str) -> Result<Option<User>, BackendError> {
        // An empty JWT means "no session" for Supabase clients.
        if token.is_empty() {
            return Ok(None);
        }

        let url = self.endpoint(USER_PATH)?;

        let response = self
            .http()
            .get(url)
            .header("apikey", self.api_key())
            .bearer_auth(token)
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        if body.is_null() {
            return Ok(None);
        }

        let user: User = serde_json::from_value(body)?;
        if user.id.is_empty() {
            debug!("user response without id");
            return Ok(None);
        }

        Ok(Some(user))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: &str) -> Result<(), BackendError> {
        let mut url = self.endpoint(ADMIN_USERS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id);

        let response = self
            .http()
            .delete(url)
            .header("apikey", self.api_key())
            .bearer_auth(self.api_key())
            .json(&json!({ "should_soft_delete": false }))
            .send()
            .await?;

        ensure_success(response).await?;

        debug!("user deleted");

        Ok(())
    }
}

#[async_trait]
impl HealthProbe for SupabaseClient {
    #[instrument(skip(self))]
    async fn probe(&self) -> Result<(), BackendError> {
        let url = self.endpoint(HEALTH_PATH)?;

        let response = self
            .http()
            .get(url)
            .header("apikey", self.api_key())
            .send()
            .await?;

        ensure_success(response).await?;

        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = error_body(response.text().await);

    Err(BackendError::Api {
        status,
        message: error_message(status, &body),
    })
}

fn error_body(read: Result<String, reqwest::Error>) -> String {
    read.unwrap_or_else(|err| {
        debug!("failed to read error body: {err}");
        String::new()
    })
}

/// Pick the human readable part of a GoTrue error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(message) = fields
                .get(key)
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
            {
                return message.to_string();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use secrecy::SecretString;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn unreadable_error_body_falls_back_to_reason() -> Result<()> {
        let Err(err) = reqwest::Client::new().get("not a url").send().await else {
            bail!("expected a request error");
        };

        let body = error_body(Err(err));
        assert!(body.is_empty());
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, &body),
            "Bad Gateway"
        );
        Ok(())
    }

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(base_url: &str, key: &str) -> Result<SupabaseClient> {
        Ok(SupabaseClient::new(
            base_url,
            SecretString::from(key.to_string()),
            None,
        )?)
    }

    #[test]
    fn error_message_prefers_msg() {
        let body = r#"{"code":403,"error_code":"bad_jwt","msg":"invalid JWT","message":"other"}"#;
        assert_eq!(error_message(StatusCode::FORBIDDEN, body), "invalid JWT");
    }

    #[test]
    fn error_message_falls_back_through_fields() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"bad request"}"#),
            "bad request"
        );
        assert_eq!(
            error_message(
                StatusCode::UNAUTHORIZED,
                r#"{"error":"invalid_grant","error_description":"expired"}"#
            ),
            "expired"
        );
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_grant"}"#),
            "invalid_grant"
        );
    }

    #[test]
    fn error_message_uses_raw_body_when_unstructured() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream connect error\n"),
            "upstream connect error"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"code":400}"#),
            r#"{"code":400}"#
        );
    }

    #[test]
    fn error_message_empty_body_uses_reason() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }

    #[tokio::test]
    async fn get_user_sends_apikey_and_bearer_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1",
                "email": "alice@example.com",
                "aud": "authenticated"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = client(&server.uri(), "service-key")?;
        let Some(user) = backend.get_user("abc123").await? else {
            bail!("expected token to resolve to a user");
        };

        assert_eq!(user.id, "u1");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.extra.get("aud"), Some(&json!("authenticated")));
        Ok(())
    }

    #[tokio::test]
    async fn get_user_rejected_token_is_api_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": 403,
                "error_code": "bad_jwt",
                "msg": "invalid JWT: unable to parse or verify signature"
            })))
            .mount(&server)
            .await;

        let result = client(&server.uri(), "service-key")?
            .get_user("badtoken")
            .await;

        match result {
            Err(BackendError::Api { status, message }) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "invalid JWT: unable to parse or verify signature");
            }
            other => bail!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn get_user_without_id_is_none() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let user = client(&server.uri(), "service-key")?
            .get_user("abc123")
            .await?;
        assert_eq!(user, None);
        Ok(())
    }

    #[tokio::test]
    async fn get_user_null_body_is_none() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
            .mount(&server)
            .await;

        let user = client(&server.uri(), "service-key")?
            .get_user("abc123")
            .await?;
        assert_eq!(user, None);
        Ok(())
    }

    #[tokio::test]
    async fn get_user_empty_token_skips_backend() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
            .expect(0)
            .mount(&server)
            .await;

        let user = client(&server.uri(), "service-key")?.get_user("").await?;
        assert_eq!(user, None);
        Ok(())
    }

    #[tokio::test]
    async fn delete_user_sends_admin_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/auth/v1/admin/users/u1"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .and(body_json(json!({ "should_soft_delete": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server.uri(), "service-key")?
            .delete_user("u1")
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn delete_user_failure_keeps_backend_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/auth/v1/admin/users/u1"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "message": "rate limited" })),
            )
            .mount(&server)
            .await;

        let backend = client(&server.uri(), "service-key")?;
        let Err(err) = backend.delete_user("u1").await else {
            bail!("expected delete to fail");
        };

        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        Ok(())
    }

    #[tokio::test]
    async fn delete_user_on_prefixed_base_url() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/supabase/auth/v1/admin/users/u1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&format!("{}/supabase", server.uri()), "service-key")?
            .delete_user("u1")
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn probe_uses_public_key() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/health"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "version": "v2.170.0",
                "name": "GoTrue"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server.uri(), "anon-key")?.probe().await?;
        Ok(())
    }

    #[tokio::test]
    async fn probe_reports_unhealthy_backend() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let backend = client(&server.uri(), "anon-key")?;
        let Err(err) = backend.probe().await else {
            bail!("expected probe to fail");
        };
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.to_string(), "Service Unavailable");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        // Reserve a port, then release it so nothing is listening there.
        let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();

        let result = client(&format!("http://127.0.0.1:{port}"), "service-key")?
            .delete_user("u1")
            .await;

        assert!(matches!(result, Err(BackendError::Transport(_))));
        Ok(())
    }
}
