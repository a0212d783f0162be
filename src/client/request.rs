//! Shared request helpers.

use crate::{Error, Result};

/// Turn non-success responses into [`Error::Api`] carrying the body text.
pub async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            message: text,
            status: Some(status),
        });
    }
    Ok(response)
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
