use std::net::IpAddr;

use dom_smoothie::{Article, Readability, TextMode};
use tracing::{info, warn};

use common::error::AppError;

use super::RawDocument;

/// Fetches a page over http(s), strips the markup down to readable text and
/// yields a single raw unit for the page body. Network failures, non-2xx
/// statuses and empty bodies are all recoverable per-URL errors.
pub async fn load_web_page(client: &reqwest::Client, url: &str) -> Result<RawDocument, AppError> {
    let parsed =
        url::Url::parse(url).map_err(|_| AppError::Validation("Invalid URL".to_string()))?;
    ensure_ingestion_url_allowed(&parsed)?;

    let response = client.get(parsed).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Processing(format!(
            "URL {url} returned status {status}"
        )));
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(AppError::Processing(format!(
            "URL {url} returned an empty body"
        )));
    }

    let config = dom_smoothie::Config {
        text_mode: TextMode::Markdown,
        ..Default::default()
    };
    let mut readability = Readability::new(body, None, Some(config))?;
    let article: Article = readability.parse()?;

    let text = article.text_content.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Processing(format!(
            "No readable content found at {url}"
        )));
    }

    info!(%url, chars = text.len(), "Fetched and cleaned web page");

    let title = article.title.trim().to_string();
    let section = (!title.is_empty()).then_some(title);
    Ok(RawDocument::new(text, section))
}

fn ensure_ingestion_url_allowed(url: &url::Url) -> Result<(), AppError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            warn!(%url, %scheme, "Rejected ingestion URL due to unsupported scheme");
            return Err(AppError::Validation(
                "Unsupported URL scheme for ingestion".to_string(),
            ));
        }
    }

    let Some(host) = url.host_str() else {
        warn!(%url, "Rejected ingestion URL missing host");
        return Err(AppError::Validation(
            "URL is missing a host component".to_string(),
        ));
    };

    if host.eq_ignore_ascii_case("localhost") {
        warn!(%url, host, "Rejected ingestion URL to localhost");
        return Err(AppError::Validation(
            "Ingestion URL host is not allowed".to_string(),
        ));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        let is_disallowed = match ip {
            IpAddr::V4(v4) => v4.is_private() || v4.is_link_local(),
            IpAddr::V6(v6) => v6.is_unique_local() || v6.is_unicast_link_local(),
        };

        if ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || is_disallowed {
            warn!(%url, host, %ip, "Rejected ingestion URL pointing to restricted network range");
            return Err(AppError::Validation(
                "Ingestion URL host is not allowed".to_string(),
            ));
        }
    }

    Ok(())
}
