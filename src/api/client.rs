//! HTTP client for the HRIS REST backend.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{AppError, Result};

/// Field errors shown in a validation message.
const MAX_FIELD_ERRORS: usize = 3;

/// Authenticated JSON client. Cheap to clone; clones share one connection
/// pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("hris-desk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!("{} {}", method, url);

        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if self.config.has_token() {
            builder.bearer_auth(self.config.token.trim())
        } else {
            builder
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            decode_body(&body)
        } else {
            let err = error_from_response(status, &body);
            warn!("Request failed: {}", err);
            Err(err)
        }
    }

    /// Send a request whose success body, if any, carries nothing we need.
    async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await?;
        let err = error_from_response(status, &body);
        warn!("Request failed: {}", err);
        Err(err)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_query<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_unit(self.request(Method::DELETE, path)).await
    }

    /// Single resource wrapped as `{ "data": ... }`.
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get::<Envelope<T>>(path).await.map(|e| e.data)
    }

    pub async fn post_data<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.post::<B, Envelope<T>>(path, body).await.map(|e| e.data)
    }

    pub async fn patch_data<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.patch::<B, Envelope<T>>(path, body).await.map(|e| e.data)
    }

    pub async fn put_data<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.put::<B, Envelope<T>>(path, body).await.map(|e| e.data)
    }

    /// Check that the backend is reachable and the token is accepted.
    pub async fn ping(&self) -> Result<()> {
        let _: Value = self.get("health").await?;
        Ok(())
    }
}

/// `{ "data": ... }` wrapper used for single resources.
#[derive(Debug, serde::Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Decode a success body. An empty body (e.g. 204) decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = body.trim();
    let text = if body.is_empty() { "null" } else { body };
    Ok(serde_json::from_str(text)?)
}

fn field_errors(value: &Value) -> Vec<String> {
    let Some(errors) = value.get("errors").and_then(Value::as_object) else {
        return Vec::new();
    };

    errors
        .iter()
        .filter_map(|(field, detail)| {
            let message = match detail {
                Value::String(s) => Some(s.as_str()),
                Value::Array(items) => items.iter().find_map(Value::as_str),
                _ => None,
            }?;
            Some(format!("{field}: {message}"))
        })
        .take(MAX_FIELD_ERRORS)
        .collect()
}

/// Map a non-success response to an error.
pub fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            let text = body.trim();
            if text.is_empty() || text.starts_with('<') {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text.chars().take(200).collect()
            }
        });

    match status.as_u16() {
        401 | 403 => AppError::Unauthorized,
        404 => AppError::NotFound(message),
        422 => {
            let fields = parsed.as_ref().map(field_errors).unwrap_or_default();
            if fields.is_empty() {
                AppError::Validation(message)
            } else {
                AppError::Validation(format!("{message} ({})", fields.join("; ")))
            }
        }
        code => AppError::Api { status: code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;

    #[test]
    fn test_error_mapping() {
        assert!(error_from_response(StatusCode::UNAUTHORIZED, "").is_auth());
        assert!(error_from_response(StatusCode::FORBIDDEN, "{}").is_auth());

        match error_from_response(StatusCode::NOT_FOUND, r#"{"message":"Employee not found"}"#) {
            AppError::NotFound(msg) => assert_eq!(msg, "Employee not found"),
            other => panic!("unexpected {other:?}"),
        }

        match error_from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>") {
            AppError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validation_errors_include_fields() {
        let body = r#"{
            "message": "The given data was invalid",
            "errors": {
                "email": ["The email has already been taken."],
                "nik": "The nik must be 16 digits."
            }
        }"#;
        match error_from_response(StatusCode::UNPROCESSABLE_ENTITY, body) {
            AppError::Validation(msg) => {
                assert!(msg.starts_with("The given data was invalid"));
                assert!(msg.contains("email: The email has already been taken."));
                assert!(msg.contains("nik: The nik must be 16 digits."));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_body_as_unit() {
        decode_body::<()>("").unwrap();
        let value: Option<i64> = decode_body("  ").unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token() {
        let server = mock::serve(vec![mock::Reply::json(200, r#"{"data":{"status":"ok"}}"#)]).await;
        let client = ApiClient::new(&server.config("secret-token")).unwrap();

        let value: Value = client.get_data("/health").await.unwrap();
        assert_eq!(value["status"], "ok");

        let requests = server.requests().await;
        assert!(requests[0].starts_with("GET /api/v1/health HTTP/1.1"));
        assert!(requests[0].to_lowercase().contains("authorization: bearer secret-token"));
    }

    #[tokio::test]
    async fn test_delete_with_no_content() {
        let server = mock::serve(vec![mock::Reply::empty(204)]).await;
        let client = ApiClient::new(&server.config("t")).unwrap();

        client.delete("employees/7").await.unwrap();
        assert!(server.requests().await[0].starts_with("DELETE /api/v1/employees/7 "));
    }

    #[tokio::test]
    async fn test_delete_ignores_success_message() {
        let server = mock::serve(vec![
            mock::Reply::json(200, r#"{"message":"Employee deleted"}"#),
            mock::Reply::json(404, r#"{"message":"Employee not found"}"#),
        ])
        .await;
        let client = ApiClient::new(&server.config("t")).unwrap();

        client.delete("employees/7").await.unwrap();
        match client.delete("employees/7").await.unwrap_err() {
            AppError::NotFound(msg) => assert_eq!(msg, "Employee not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_response() {
        let server = mock::serve(vec![mock::Reply::json(401, r#"{"message":"Token expired"}"#)]).await;
        let client = ApiClient::new(&server.config("old")).unwrap();

        let err = client.ping().await.unwrap_err();
        assert!(err.is_auth());
    }
}
