use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin client for the PostgREST endpoint that fronts the clinic database.
/// All cells read and write rows through this; the schema itself is owned
/// by the database, not by this workspace.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_rest_url.trim_end_matches('/').to_string(),
            service_key: config.database_service_key.clone(),
        }
    }

    fn headers(&self, returning: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.service_key.is_empty() {
            headers.insert("apikey", HeaderValue::from_str(&self.service_key).unwrap());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.service_key)).unwrap(),
            );
        }
        if returning {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        returning: bool,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(returning));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Database API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("Database API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    /// GET rows; `path` carries PostgREST filters, e.g.
    /// `/appointments?doctor_id=eq.{id}&order=start_time.asc`.
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::GET, path, None, false).await?;
        Ok(response.json::<T>().await?)
    }

    /// INSERT a row and return the representation.
    pub async fn insert<T>(&self, path: &str, body: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body), true).await?;
        Ok(response.json::<T>().await?)
    }

    /// PATCH rows matched by the path filter and return the representation.
    pub async fn update<T>(&self, path: &str, body: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::PATCH, path, Some(body), true).await?;
        Ok(response.json::<T>().await?)
    }

    /// DELETE rows matched by the path filter.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None, false).await?;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
