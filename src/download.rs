use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, UltradownError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Initialize HTTP client with default configuration
pub(crate) fn get_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(DEFAULT_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Get default headers for requests
fn get_default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

/// Execute HTTP request with error handling
async fn execute_request(
    client: reqwest::Client,
    method: reqwest::Method,
    url: &str,
    timeout: Option<Duration>,
) -> Result<reqwest::Response> {
    let mut request = client
        .request(method, url)
        .headers(get_default_headers());
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            UltradownError::RequestTimeout(url.to_string())
        } else {
            UltradownError::NetworkError(e)
        }
    })?;

    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(UltradownError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Download text content with a per-request timeout
pub async fn download_text_with_timeout(url: &str, timeout: Duration) -> Result<String> {
    let client = get_http_client();
    let response = execute_request(client, reqwest::Method::GET, url, Some(timeout)).await?;
    response.text().await.map_err(UltradownError::from)
}

/// Download binary data from URL
pub async fn download_binary(url: &str) -> Result<Vec<u8>> {
    let client = get_http_client();
    let response = execute_request(client, reqwest::Method::GET, url, None).await?;
    let bytes = response.bytes().await.map_err(UltradownError::from)?;
    Ok(bytes.to_vec())
}

/// Execute POST request with JSON body and parse JSON response
pub async fn post_json<T: DeserializeOwned, B: Serialize>(url: &str, body: &B) -> Result<T> {
    let client = get_http_client();
    let request = client
        .post(url)
        .headers(get_default_headers())
        .json(body);

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            UltradownError::RequestTimeout(url.to_string())
        } else {
            UltradownError::NetworkError(e)
        }
    })?;

    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(UltradownError::from)
    } else {
        Err(UltradownError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Fetch a media URL and save it under `dir` with a sanitized filename.
///
/// Returns the path of the written file.
pub async fn save_binary(url: &str, dir: &Path, filename: &str) -> Result<PathBuf> {
    let bytes = download_binary(url).await?;
    if bytes.is_empty() {
        return Err(UltradownError::DownloadFailed(format!(
            "Empty response body for {url}"
        )));
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(sanitize_filename::sanitize(filename));
    std::fs::write(&path, &bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_path_is_sanitized() {
        // sanitize-filename strips path separators so a crafted title cannot
        // escape the download directory
        let name = sanitize_filename::sanitize("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
    }
}
