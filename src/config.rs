use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthSettings,
}

/// Settings consumed by registration, login and the bearer-token extractor.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Only `<local>@<campus_email_domain>` addresses may register.
    pub campus_email_domain: String,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            port,
            database_url,
            host,
            auth: AuthSettings::from_env()?,
        })
    }
}

impl AuthSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let campus_email_domain = env::var("CAMPUS_EMAIL_DOMAIN")
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .unwrap_or_else(|_| "thapar.edu".to_string());
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24 * 7);
        Ok(Self {
            jwt_secret,
            campus_email_domain,
            token_ttl_hours,
        })
    }
}
