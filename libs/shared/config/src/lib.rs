use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_rest_url: String,
    pub database_service_key: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_rest_url: env::var("DATABASE_REST_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_REST_URL not set, using empty value");
                    String::new()
                }),
            database_service_key: env::var("DATABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_rest_url.is_empty() && !self.database_service_key.is_empty()
    }
}
