// src/utils/http.rs

//! HTTP client utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, DNT, HeaderMap, HeaderName, HeaderValue, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Browser-like headers sent with every request to the origin site.
pub fn browser_headers(config: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    headers.insert(REFERER, header_value(&config.referer)?);
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("cross-site"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("invalid header value {value:?}: {e}")))
}

/// Create a configured asynchronous HTTP client.
///
/// The cookie store keeps the origin session across gallery, viewer and
/// form requests.
pub fn create_async_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(browser_headers(config)?)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// GET a page and return its body as text.
pub async fn fetch_text(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    let text = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

/// POST form fields and return the response body as text.
pub async fn post_form(
    client: &Client,
    url: &str,
    fields: &BTreeMap<String, String>,
    timeout: Duration,
) -> Result<String> {
    let text = client
        .post(url)
        .form(fields)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

/// GET a resource and return its raw bytes.
pub async fn fetch_bytes(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let bytes = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers_use_config() {
        let config = HttpConfig::default();
        let headers = browser_headers(&config).unwrap();
        assert_eq!(headers.get(REFERER).unwrap(), "https://imx.to/");
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en-US,en;q=0.9");
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "navigate");
    }

    #[test]
    fn test_browser_headers_reject_control_chars() {
        let config = HttpConfig {
            referer: "bad\nvalue".to_string(),
            ..HttpConfig::default()
        };
        assert!(matches!(
            browser_headers(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_create_client() {
        assert!(create_async_client(&HttpConfig::default()).is_ok());
    }
}
