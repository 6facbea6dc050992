use bytes::Bytes;
use url::Url;

/// A fully read response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: Url,
    pub status: u16,
    /// Header names are lowercase; order is as received.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(url: Url, status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            url,
            status,
            headers,
            body: body.into(),
        }
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The media type without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let r = FetchResponse::new(
            Url::parse("http://h/s.ttl").unwrap(),
            200,
            vec![("content-type".into(), "text/turtle; charset=utf-8".into())],
            "",
        );
        assert_eq!(r.header("Content-Type"), Some("text/turtle; charset=utf-8"));
        assert_eq!(r.content_type(), Some("text/turtle"));
        assert!(r.header("etag").is_none());
        assert!(r.is_success());
    }
}
