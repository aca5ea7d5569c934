use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;

/// The opaque per-client token that scopes every write and every query.
/// Issued by the caller's client stack and replayed on each request; this
/// service only requires that it is present and non-blank.
#[derive(Debug, Clone)]
pub struct ClientId(pub String);

pub async fn require_client_identity(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client_id = extract_client_id(&request).ok_or_else(|| {
        ApiError::Unauthorized("A client identity header is required".to_string())
    })?;

    request.extensions_mut().insert(ClientId(client_id));

    Ok(next.run(request).await)
}

fn extract_client_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get("X-Client-Id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn request_with_header(value: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/ask");
        if let Some(value) = value {
            builder = builder.header("X-Client-Id", value);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn test_extracts_trimmed_client_id() {
        let request = request_with_header(Some("  client-42  "));
        assert_eq!(extract_client_id(&request), Some("client-42".to_string()));
    }

    #[test]
    fn test_missing_header_yields_none() {
        let request = request_with_header(None);
        assert_eq!(extract_client_id(&request), None);
    }

    #[test]
    fn test_blank_header_yields_none() {
        let request = request_with_header(Some("   "));
        assert_eq!(extract_client_id(&request), None);
    }
}
