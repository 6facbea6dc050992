use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use shapetree_protocol::{ErrorBody, HealthResponse, LdpRequest, LdpResponse, Method};
use url::Url;

use crate::dispatch::Dispatcher;

/// Shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Request paths resolve against this URL.
    pub base_url: Url,
    pub storage_kind: &'static str,
    pub max_body_bytes: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.storage_kind))
}

/// Hand every other request to the dispatcher.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let target = match target_url(&state.base_url, &parts.uri) {
        Ok(target) => target,
        Err(e) => return reject(400, "BadRequest", format!("bad request target: {e}")),
    };
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => return reject(413, "PayloadTooLarge", e.to_string()),
    };

    let mut ldp = LdpRequest::new(Method::parse(parts.method.as_str()), target).with_body(body);
    for (name, value) in &parts.headers {
        match value.to_str() {
            Ok(value) => ldp = ldp.with_header(name.as_str(), value),
            Err(_) => tracing::debug!(header = %name, "skipping non-ASCII header"),
        }
    }
    into_response(state.dispatcher.handle(ldp).await)
}

fn target_url(base: &Url, uri: &Uri) -> Result<Url, url::ParseError> {
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    base.join(path)
}

fn reject(status: u16, kind: &str, message: String) -> Response {
    let body = ErrorBody {
        message,
        error: kind.to_string(),
        stack: Vec::new(),
    };
    into_response(LdpResponse::error(status, &body).unwrap_or_else(|_| LdpResponse::new(status)))
}

pub(crate) fn into_response(response: LdpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping unrepresentable response header"),
        }
    }
    (status, headers, Body::from(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_resolve_against_the_base() {
        let base = Url::parse("http://localhost:12345/").unwrap();
        let uri: Uri = "/Apps/proj1/?x=1".parse().unwrap();
        assert_eq!(
            target_url(&base, &uri).unwrap().as_str(),
            "http://localhost:12345/Apps/proj1/?x=1"
        );
    }

    #[test]
    fn responses_keep_status_and_headers() {
        let loc = Url::parse("http://h/a/").unwrap();
        let r = into_response(LdpResponse::created(&loc));
        assert_eq!(r.status(), StatusCode::CREATED);
        assert_eq!(r.headers()["location"], "http://h/a/");
        assert!(r.headers().get("content-type").is_none());
    }
}
