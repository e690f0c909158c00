use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::download::download_text_with_timeout;
use crate::error::{Result, UltradownError};

/// Per-proxy attempt budget. One try per proxy, no retry within an attempt.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(12);

/// Narrow transport seam so fallback logic can be exercised without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Real transport: plain GET bounded by [`PROXY_TIMEOUT`]
pub struct HttpTransport;

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        download_text_with_timeout(url, PROXY_TIMEOUT).await
    }
}

type ProxyBuilder = fn(&str) -> String;

fn allorigins_raw(target: &str) -> String {
    format!(
        "https://api.allorigins.win/raw?url={}",
        urlencoding::encode(target)
    )
}

fn corsproxy(target: &str) -> String {
    format!("https://corsproxy.io/?{}", urlencoding::encode(target))
}

/// Ordered CORS-bypass proxy list; iterated sequentially, never concurrently
static PROXIES: &[ProxyBuilder] = &[allorigins_raw, corsproxy];

/// Wrapping endpoint variant whose response carries the raw page body in a
/// `contents` field (or a resolved redirect target in a `url` field).
pub fn allorigins_get(target: &str) -> String {
    format!(
        "https://api.allorigins.win/get?url={}",
        urlencoding::encode(target)
    )
}

/// An empty-ish scalar from a proxy means the proxy mangled or swallowed the
/// upstream response; only substantive values count as a hit.
fn is_substantive(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Try each proxy in order against `target` until one returns parseable JSON.
///
/// Non-success status, network error, timeout, non-JSON bodies, and empty-ish
/// scalar payloads are all soft failures: log and move to the next proxy.
/// Returns `None` once the list is exhausted.
pub async fn fetch_json_via_proxies(transport: &dyn Transport, target: &str) -> Option<Value> {
    for build in PROXIES {
        let proxy_url = build(target);
        let text = match transport.get_text(&proxy_url).await {
            Ok(text) => text,
            Err(e) => {
                debug!("Proxy attempt failed for {proxy_url}: {e}");
                continue;
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) if is_substantive(&value) => return Some(value),
            _ => {
                debug!("Proxy returned unusable body for {proxy_url}");
                continue;
            }
        }
    }
    warn!("All proxies exhausted for {target}");
    None
}

/// Fetch a page's raw markup through the direct wrapping proxy.
pub async fn fetch_page_via_proxy(transport: &dyn Transport, target: &str) -> Result<String> {
    let wrapper = allorigins_get(target);
    let text = transport.get_text(&wrapper).await?;
    let value: Value = serde_json::from_str(&text)?;
    value
        .get("contents")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            UltradownError::ParseError(format!("Page wrapper missing contents for {target}"))
        })
}
