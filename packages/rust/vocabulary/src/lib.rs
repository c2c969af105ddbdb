//! Controlled tag vocabulary.
//!
//! The tagging utility only ever writes tags that appear in a hosted JSON
//! list. This crate fetches that list once per run and exposes it as an
//! immutable [`TagSet`].

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use scribe_shared::{Result, ScribeError};

/// Maximum response size we accept for a vocabulary (10 MB).
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// User-Agent string for vocabulary requests.
const USER_AGENT: &str = concat!("scribe/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// TagSet
// ---------------------------------------------------------------------------

/// Ordered, deduplicated set of permitted tags.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl TagSet {
    /// Exact, case-sensitive membership.
    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Tags in the order the vocabulary listed them.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Comma-joined list, as embedded in prompts.
    pub fn joined(&self) -> String {
        self.ordered.join(", ")
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::default();
        for tag in iter {
            let tag = tag.into();
            if set.index.insert(tag.clone()) {
                set.ordered.push(tag);
            }
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ScribeError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch the vocabulary: one GET expecting a JSON array of strings.
#[instrument(skip(client))]
pub async fn fetch_tag_list(client: &Client, url: &str) -> Result<TagSet> {
    fetch_capped(client, url, MAX_RESPONSE_SIZE).await
}

async fn fetch_capped(client: &Client, url: &str, max_size: usize) -> Result<TagSet> {
    let parsed =
        Url::parse(url).map_err(|e| ScribeError::Network(format!("invalid URL '{url}': {e}")))?;

    info!("fetching tag vocabulary");

    let mut response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| ScribeError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScribeError::Network(format!("{url}: HTTP {status}")));
    }

    let too_large = |len: u64| {
        ScribeError::format(format!(
            "{url}: response too large ({len} bytes, max {max_size})"
        ))
    };

    if let Some(len) = response.content_length() {
        if len > max_size as u64 {
            return Err(too_large(len));
        }
    }

    // Content-Length may be absent (chunked) or wrong; count what arrives.
    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ScribeError::Network(format!("{url}: failed to read body: {e}")))?
    {
        if bytes.len() + chunk.len() > max_size {
            return Err(too_large((bytes.len() + chunk.len()) as u64));
        }
        bytes.extend_from_slice(&chunk);
    }

    let body = String::from_utf8(bytes)
        .map_err(|e| ScribeError::format(format!("{url}: body is not UTF-8: {e}")))?;

    let tags = parse_tag_list(&body)
        .map_err(|e| ScribeError::format(format!("{url}: {e}")))?;

    debug!(tags = tags.len(), "vocabulary loaded");
    Ok(tags)
}

/// Parse a JSON array of strings into a [`TagSet`].
pub fn parse_tag_list(body: &str) -> std::result::Result<TagSet, String> {
    let tags: Vec<String> = serde_json::from_str(body)
        .map_err(|e| format!("expected a JSON array of strings: {e}"))?;
    Ok(tags.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serve one response with a chunked body and no Content-Length.
    async fn chunked_server(chunks: Vec<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let mut out = b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ntransfer-encoding: chunked\r\n\r\n".to_vec();
            for chunk in chunks {
                out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
                out.extend_from_slice(&chunk);
                out.extend_from_slice(b"\r\n");
            }
            out.extend_from_slice(b"0\r\n\r\n");
            let _ = socket.write_all(&out).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/tags.json")
    }

    #[test]
    fn tag_set_dedups_and_keeps_order() {
        let set: TagSet = ["rust", "garden", "rust", "cooking"].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.joined(), "rust, garden, cooking");
        assert!(set.contains("garden"));
        assert!(!set.contains("Garden"));
    }

    #[test]
    fn parse_rejects_non_string_entries() {
        assert!(parse_tag_list(r#"["a", 1]"#).is_err());
        assert!(parse_tag_list(r#"{"tags": ["a"]}"#).is_err());
        assert_eq!(parse_tag_list(r#"["a","b"]"#).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn fetch_from_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tags.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["foo","bar","baz"]"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = build_client(5).unwrap();
        let tags = fetch_tag_list(&client, &format!("{}/tags.json", server.uri()))
            .await
            .expect("fetch");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["foo", "bar", "baz"]);
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = build_client(5).unwrap();
        let err = fetch_tag_list(&client, &format!("{}/tags.json", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Network(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn wrong_shape_is_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"tags":["foo"]}"#))
            .mount(&server)
            .await;

        let client = build_client(5).unwrap();
        let err = fetch_tag_list(&client, &format!("{}/tags.json", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Format { .. }));
    }

    #[tokio::test]
    async fn oversized_body_is_format_error() {
        let server = MockServer::start().await;
        let mut body = b"[\"a\"".to_vec();
        body.resize(MAX_RESPONSE_SIZE + 1, b' ');
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let client = build_client(30).unwrap();
        let err = fetch_tag_list(&client, &format!("{}/tags.json", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Format { .. }));
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn chunked_body_over_limit_is_format_error() {
        let url = chunked_server(vec![b"[\"foo\",".to_vec(), b" \"bar\"]".to_vec()]).await;

        let client = build_client(5).unwrap();
        let err = fetch_capped(&client, &url, 10).await.unwrap_err();
        assert!(matches!(err, ScribeError::Format { .. }));
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn chunked_body_within_limit_is_read() {
        let url = chunked_server(vec![b"[\"foo\",".to_vec(), b" \"bar\"]".to_vec()]).await;

        let client = build_client(5).unwrap();
        let tags = fetch_capped(&client, &url, 64).await.expect("fetch");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["foo", "bar"]);
    }

    #[tokio::test]
    async fn invalid_url_is_network_error() {
        let client = build_client(5).unwrap();
        let err = fetch_tag_list(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, ScribeError::Network(_)));
    }
}
