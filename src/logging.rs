//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};
use serde_json::Value;

/// The maximum number of body bytes logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body logged at the `debug` level. Passwords in JSON request
/// bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    if headers.method == axum::http::Method::POST
        && headers.headers.get(CONTENT_TYPE) == Some(&"application/json".parse().unwrap())
    {
        let display_text = redact_password(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

fn redact_password(body_text: &str, field_name: &str) -> String {
    let mut value: Value = match serde_json::from_str(body_text) {
        Ok(value) => value,
        Err(_) => return body_text.to_owned(),
    };

    match value
        .as_object_mut()
        .and_then(|object| object.get_mut(field_name))
    {
        Some(password) => {
            *password = Value::String("********".to_owned());
            value.to_string()
        }
        None => body_text.to_owned(),
    }
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a
/// multibyte character.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod truncate_body_tests {
    use super::{LOG_BODY_LENGTH_LIMIT, truncate_body};

    #[test]
    fn returns_short_bodies_unchanged() {
        let body = r#"{"vehicleName":"Family Car"}"#;

        assert_eq!(truncate_body(body), body);
    }

    #[test]
    fn cuts_ascii_bodies_at_the_limit() {
        let body = "a".repeat(2 * LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncate_body(&body), "a".repeat(LOG_BODY_LENGTH_LIMIT));
    }

    #[test]
    fn backs_up_when_the_limit_splits_a_character() {
        // The two byte 'é' occupies bytes 63 and 64, so cutting at the limit
        // would land inside it.
        let prefix = "a".repeat(LOG_BODY_LENGTH_LIMIT - 1);
        let body = format!("{prefix}économiser enough words to pass the limit");

        assert_eq!(truncate_body(&body), prefix);
    }
}

#[cfg(test)]
mod redact_password_tests {
    use super::redact_password;

    #[test]
    fn redacts_the_password_field() {
        let body = r#"{"email":"edward@example.com","password":"hunter2"}"#;

        let redacted = redact_password(body, "password");

        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("********"));
        assert!(redacted.contains("edward@example.com"));
    }

    #[test]
    fn leaves_bodies_without_a_password_unchanged() {
        let body = r#"{"vehicleName":"Family Car"}"#;

        assert_eq!(redact_password(body, "password"), body);
    }

    #[test]
    fn leaves_invalid_json_unchanged() {
        let body = "password=hunter2";

        assert_eq!(redact_password(body, "password"), body);
    }
}
