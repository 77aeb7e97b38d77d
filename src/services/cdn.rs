//! Cloudflare Images client.
//!
//! All operations degrade to warn-and-skip when credentials are missing, so
//! local development works without a Cloudflare account. A configured client
//! that gets an error response from the API surfaces it as a 502-class error.

use reqwest::multipart;
use serde::Deserialize;

use crate::errors::AppError;

const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Credential triple (plus optional zone for cache purging).
#[derive(Debug, Clone)]
pub struct CdnCredentials {
    pub account_id: String,
    pub api_key: String,
    pub email: String,
    pub zone_id: Option<String>,
}

/// Cloudflare Images API client.
pub struct CloudflareImages {
    http: reqwest::Client,
    api_base: String,
    credentials: Option<CdnCredentials>,
}

#[derive(Debug, Deserialize)]
struct CfEnvelope {
    success: bool,
    #[serde(default)]
    errors: Vec<CfError>,
    result: Option<CfResult>,
}

#[derive(Debug, Deserialize)]
struct CfError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CfResult {
    #[serde(default)]
    variants: Vec<String>,
}

impl CloudflareImages {
    pub fn new(credentials: Option<CdnCredentials>) -> Self {
        Self::with_api_base(credentials, API_BASE)
    }

    /// Client pointed at an alternate API endpoint (a proxy, or a local stub
    /// in tests).
    pub fn with_api_base(
        credentials: Option<CdnCredentials>,
        api_base: impl Into<String>,
    ) -> Self {
        if credentials.is_none() {
            tracing::warn!("Cloudflare credentials not configured; CDN operations are no-ops");
        }
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            credentials,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Upload an image under the given id. Returns the delivery URL.
    ///
    /// Without credentials this returns a local placeholder URL so the
    /// gallery row can still be created in development.
    pub async fn upload_image(
        &self,
        id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let Some(creds) = &self.credentials else {
            tracing::warn!(media_id = %id, "skipping CDN upload: no credentials");
            return Ok(format!("/uploads/{id}"));
        };

        let form = multipart::Form::new()
            .text("id", id.to_string())
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(filename.to_string()),
            );

        let response = self
            .http
            .post(format!(
                "{}/accounts/{}/images/v1",
                self.api_base, creds.account_id
            ))
            .header("X-Auth-Email", &creds.email)
            .header("X-Auth-Key", &creds.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Cloudflare upload failed: {e}")))?;

        let envelope: CfEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Cloudflare response unreadable: {e}")))?;

        if !envelope.success {
            return Err(AppError::Upstream(cf_error_message(&envelope)));
        }

        envelope
            .result
            .and_then(|r| r.variants.into_iter().next())
            .ok_or_else(|| {
                AppError::Upstream("Cloudflare upload returned no delivery URL".to_string())
            })
    }

    /// Delete an image by id. Missing credentials or an already-deleted image
    /// are both treated as success.
    pub async fn delete_image(&self, id: &str) -> Result<(), AppError> {
        let Some(creds) = &self.credentials else {
            tracing::warn!(media_id = %id, "skipping CDN delete: no credentials");
            return Ok(());
        };

        let response = self
            .http
            .delete(format!(
                "{}/accounts/{}/images/v1/{id}",
                self.api_base, creds.account_id
            ))
            .header("X-Auth-Email", &creds.email)
            .header("X-Auth-Key", &creds.api_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Cloudflare delete failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(media_id = %id, "CDN image already gone");
            return Ok(());
        }

        let envelope: CfEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Cloudflare response unreadable: {e}")))?;

        if !envelope.success {
            return Err(AppError::Upstream(cf_error_message(&envelope)));
        }
        Ok(())
    }

    /// Purge cached copies of the given URLs from the zone cache. Requires a
    /// zone id in addition to the credential triple.
    pub async fn purge_cache(&self, urls: &[String]) -> Result<(), AppError> {
        let Some(creds) = &self.credentials else {
            tracing::warn!("skipping cache purge: no credentials");
            return Ok(());
        };
        let Some(zone_id) = &creds.zone_id else {
            tracing::warn!("skipping cache purge: no zone id configured");
            return Ok(());
        };

        let response = self
            .http
            .post(format!("{}/zones/{zone_id}/purge_cache", self.api_base))
            .header("X-Auth-Email", &creds.email)
            .header("X-Auth-Key", &creds.api_key)
            .json(&serde_json::json!({ "files": urls }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Cloudflare purge failed: {e}")))?;

        let envelope: CfEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Cloudflare response unreadable: {e}")))?;

        if !envelope.success {
            return Err(AppError::Upstream(cf_error_message(&envelope)));
        }
        Ok(())
    }
}

fn cf_error_message(envelope: &CfEnvelope) -> String {
    if envelope.errors.is_empty() {
        "Cloudflare API reported failure".to_string()
    } else {
        envelope
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_noops_instead_of_failing() {
        let cdn = CloudflareImages::new(None);
        assert!(!cdn.is_configured());

        let url = cdn
            .upload_image("abc", "photo.jpg", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "/uploads/abc");

        cdn.delete_image("abc").await.unwrap();
        cdn.purge_cache(&["https://cdn.example/x".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn configured_client_surfaces_api_failure_as_upstream_error() {
        let app = axum::Router::new().route(
            "/accounts/{account}/images/v1/{id}",
            axum::routing::delete(|| async {
                axum::Json(serde_json::json!({
                    "success": false,
                    "errors": [{"message": "delivery network unavailable"}],
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let cdn = CloudflareImages::with_api_base(
            Some(CdnCredentials {
                account_id: "acct".to_string(),
                api_key: "key".to_string(),
                email: "ops@test.local".to_string(),
                zone_id: None,
            }),
            format!("http://{addr}"),
        );

        let err = cdn.delete_image("img_1").await.unwrap_err();
        match err {
            AppError::Upstream(message) => {
                assert!(message.contains("delivery network unavailable"))
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
