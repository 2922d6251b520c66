//! Request handlers.

mod http;
mod websocket;

pub use http::{get_messages, get_rooms, health_check};
pub use websocket::websocket_handler;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{domain::CallerToken, infrastructure::dto::http::ErrorDto};

/// Query parameters carrying the caller token (for clients that cannot set headers)
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Caller token from the `Authorization` header (optional `Bearer ` prefix), falling back
/// to the `token` query parameter.
fn caller_token(headers: &HeaderMap, query: &TokenQuery) -> Option<CallerToken> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim().to_string());

    from_header
        .or_else(|| query.token.clone())
        .and_then(|token| CallerToken::new(token).ok())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorDto {
            message: message.into(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_caller_token_prefers_authorization_header() {
        // テスト項目: Authorization ヘッダーの Bearer トークンがクエリより優先される
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        let query = TokenQuery {
            token: Some("query-token".to_string()),
        };

        // when (操作):
        let token = caller_token(&headers, &query);

        // then (期待する結果):
        assert_eq!(token.unwrap().as_str(), "header-token");
    }

    #[test]
    fn test_caller_token_falls_back_to_query() {
        // テスト項目: ヘッダーがない場合はクエリのトークンが使われ、空のトークンは無視される
        // given (前提条件):
        let headers = HeaderMap::new();
        let query = TokenQuery {
            token: Some("query-token".to_string()),
        };
        let empty = TokenQuery {
            token: Some("  ".to_string()),
        };

        // when (操作):
        let token = caller_token(&headers, &query);
        let missing = caller_token(&headers, &empty);

        // then (期待する結果):
        assert_eq!(token.unwrap().as_str(), "query-token");
        assert!(missing.is_none());
    }
}
