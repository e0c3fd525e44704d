//! Blocking HTTP fetcher for web pages.

use std::time::Duration;

use tracing::info;
use ureq::http::Uri;
use ureq::Agent;

use crate::{Result, ToolError};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Fetcher settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the whole request, connect to last body byte.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            user_agent: concat!("pagedown/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches HTML over HTTP(S).
pub struct Fetcher {
    agent: Agent,
    user_agent: String,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            user_agent: config.user_agent,
        }
    }

    /// GET `url` and return the response body as text.
    pub fn fetch(&self, url: &str) -> Result<String> {
        validate_url(url)?;
        info!("Fetching HTML from: {}", url);

        let response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
            .call()
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = response
            .into_body()
            .read_to_vec()
            .map_err(|e| ToolError::Http(e.to_string()))?;
        decode_body(bytes)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

/// Page bodies must be UTF-8.
fn decode_body(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes)
        .map_err(|e| pagedown::ConvertError::Parse(e.utf8_error()))?;
    Ok(text)
}

/// Accept absolute `http`/`https` URLs with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let uri: Uri = url
        .parse()
        .map_err(|_| ToolError::InvalidUrl(url.to_string()))?;

    let scheme_ok = matches!(
        uri.scheme_str().map(str::to_ascii_lowercase).as_deref(),
        Some("http" | "https")
    );
    let has_host = uri.host().is_some_and(|h| !h.is_empty());

    if scheme_ok && has_host {
        Ok(())
    } else {
        Err(ToolError::InvalidUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a local port.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/page")
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/a?b=c").is_ok());
        assert!(validate_url("HTTP://example.com").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(ToolError::InvalidUrl(_))
        ));
        assert!(validate_url("/relative/path").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b"<p>ok</p>".to_vec()).unwrap(), "<p>ok</p>");
        let err = decode_body(vec![b'<', 0xff]).unwrap_err();
        assert!(matches!(err, ToolError::Convert(_)));
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_fetch_rejects_bad_url_without_request() {
        let fetcher = Fetcher::default();
        assert!(matches!(
            fetcher.fetch("file:///etc/passwd"),
            Err(ToolError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_fetch_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 18\r\nConnection: close\r\n\r\n<h1>Fetched</h1>\r\n",
        );
        let body = Fetcher::default().fetch(&url).unwrap();
        assert_eq!(body, "<h1>Fetched</h1>\r\n");
    }

    #[test]
    fn test_fetch_status_error() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let err = Fetcher::default().fetch(&url).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch URL: 404 Not Found");
    }

    #[test]
    fn test_fetch_connection_error() {
        // bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let config = FetchConfig {
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let err = Fetcher::new(config).fetch(&format!("http://{addr}/")).unwrap_err();
        assert!(matches!(err, ToolError::Http(_)));
    }
}
