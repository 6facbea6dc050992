use std::fmt;

use bytes::Bytes;
use url::Url;

use crate::error::{ErrorBody, ProtocolResult};
use crate::link::{interaction_model, parse_link_header, shape_tree, InteractionModel, Link};
use crate::wire::{headers, media};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Other(String),
}

impl Method {
    pub fn parse(text: &str) -> Self {
        match text.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Other(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Other(m) => m,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound request, decoupled from the HTTP framework.
#[derive(Clone, Debug)]
pub struct LdpRequest {
    pub method: Method,
    pub target: Url,
    /// Lowercase names, in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl LdpRequest {
    pub fn new(method: Method, target: Url) -> Self {
        Self {
            method,
            target,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every link across all `Link` headers.
    pub fn links(&self) -> ProtocolResult<Vec<Link>> {
        let mut links = Vec::new();
        for (_, value) in self
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(headers::LINK))
        {
            links.extend(parse_link_header(value)?);
        }
        Ok(links)
    }

    pub fn interaction_model(&self) -> ProtocolResult<Option<InteractionModel>> {
        Ok(interaction_model(&self.links()?))
    }

    /// Target of a `rel="shapeTree"` link, if this is a plant request.
    pub fn shape_tree(&self) -> ProtocolResult<Option<String>> {
        Ok(shape_tree(&self.links()?).map(str::to_string))
    }

    /// Suggested name, with surrounding whitespace and slashes removed.
    pub fn slug(&self) -> Option<&str> {
        self.header(headers::SLUG)
            .map(|s| s.trim().trim_matches('/'))
            .filter(|s| !s.is_empty())
    }

    /// Media type of the body without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header(headers::CONTENT_TYPE)
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// An outbound response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl LdpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn with_body(mut self, media_type: &str, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.with_header(headers::CONTENT_TYPE, media_type)
    }

    pub fn ok(media_type: &str, body: impl Into<Bytes>) -> Self {
        Self::new(200).with_body(media_type, body)
    }

    /// `201 Created` pointing at `location`.
    pub fn created(location: &Url) -> Self {
        Self::new(201).with_header(headers::LOCATION, location.as_str())
    }

    pub fn no_content() -> Self {
        Self::new(204)
    }

    pub fn error(status: u16, body: &ErrorBody) -> ProtocolResult<Self> {
        Ok(Self::new(status).with_body(media::JSON, body.to_json()?))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LdpRequest {
        LdpRequest::new(Method::Post, Url::parse("http://h/Apps/").unwrap())
    }

    #[test]
    fn methods() {
        assert_eq!(Method::parse("post"), Method::Post);
        assert_eq!(Method::parse("PATCH"), Method::Other("PATCH".into()));
        assert_eq!(Method::Other("PATCH".into()).to_string(), "PATCH");
    }

    #[test]
    fn plant_request_headers() {
        let r = request()
            .with_header("Link", "<http://www.w3.org/ns/ldp#Container>; rel=\"type\"")
            .with_header("Link", "<http://s.example/t.ttl#root>; rel=\"shapeTree\"")
            .with_header("Slug", " proj1/ ")
            .with_header("Content-Type", "text/turtle; charset=utf-8");
        assert_eq!(r.interaction_model().unwrap(), Some(InteractionModel::Container));
        assert_eq!(r.shape_tree().unwrap().as_deref(), Some("http://s.example/t.ttl#root"));
        assert_eq!(r.slug(), Some("proj1"));
        assert_eq!(r.content_type(), Some("text/turtle"));
    }

    #[test]
    fn blank_slug_is_absent() {
        assert_eq!(request().with_header("slug", " / ").slug(), None);
    }

    #[test]
    fn created_response() {
        let loc = Url::parse("http://h/Apps/proj1/").unwrap();
        let r = LdpResponse::created(&loc).with_body(media::TURTLE, "<a> <b> <c> .");
        assert_eq!(r.status, 201);
        assert_eq!(r.header("Location"), Some("http://h/Apps/proj1/"));
        assert_eq!(r.header("content-type"), Some("text/turtle"));
    }
}
