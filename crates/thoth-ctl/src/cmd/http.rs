//! Shared HTTP request helpers for CLI commands.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

/// URL of a thothd endpoint; each segment is percent-escaped.
pub fn endpoint(port: u16, segments: &[&str]) -> Result<String> {
    let mut url = reqwest::Url::parse(&base_url(port)).context("invalid thothd address")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("thothd address cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}

pub async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
        .await
        .with_context(|| format!("failed to connect to thothd at {} (is it running?)", url))?
        .error_for_status()?
        .json::<T>()
        .await
        .context("failed to parse response")
}

/// GET with `Accept: application/json`; `None` on 404.
pub async fn get_json_opt<T: for<'de> Deserialize<'de>>(url: &str) -> Result<Option<T>> {
    let resp = reqwest::Client::new()
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("failed to connect to thothd at {} (is it running?)", url))?;
    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let value = resp
        .error_for_status()?
        .json::<T>()
        .await
        .context("failed to parse response")?;
    Ok(Some(value))
}

pub async fn post_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::Client::new()
        .post(url)
        .send()
        .await
        .with_context(|| format!("failed to connect to thothd at {} (is it running?)", url))?
        .error_for_status()?
        .json::<T>()
        .await
        .context("failed to parse response")
}

pub async fn post_json_body<T, R>(url: &str, body: &T) -> Result<R>
where
    T: Serialize,
    R: for<'de> Deserialize<'de>,
{
    reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("failed to connect to thothd at {} (is it running?)", url))?
        .error_for_status()?
        .json::<R>()
        .await
        .context("failed to parse response")
}
