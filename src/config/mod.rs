use std::env;

use crate::services::cdn::CdnCredentials;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Static admin API token. When unset the admin gate is permissive
    /// (development mode, matching the legacy deployment).
    pub admin_api_token: Option<String>,
    pub cloudflare_account_id: Option<String>,
    pub cloudflare_api_key: Option<String>,
    pub cloudflare_email: Option<String>,
    pub cloudflare_zone_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            admin_api_token: env::var("ADMIN_API_TOKEN").ok(),
            cloudflare_account_id: env::var("CLOUDFLARE_ACCOUNT_ID").ok(),
            cloudflare_api_key: env::var("CLOUDFLARE_API_KEY").ok(),
            cloudflare_email: env::var("CLOUDFLARE_EMAIL").ok(),
            cloudflare_zone_id: env::var("CLOUDFLARE_ZONE_ID").ok(),
        })
    }

    /// CDN credentials, present only when the full account/key/email triple is set.
    pub fn cdn_credentials(&self) -> Option<CdnCredentials> {
        match (
            &self.cloudflare_account_id,
            &self.cloudflare_api_key,
            &self.cloudflare_email,
        ) {
            (Some(account_id), Some(api_key), Some(email)) => Some(CdnCredentials {
                account_id: account_id.clone(),
                api_key: api_key.clone(),
                email: email.clone(),
                zone_id: self.cloudflare_zone_id.clone(),
            }),
            _ => None,
        }
    }
}
