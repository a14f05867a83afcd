use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Global route prefix for the catalog endpoints.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// First id handed out to locally created records.
    #[serde(default = "default_local_id_base")]
    pub local_id_base: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { local_id_base: default_local_id_base() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_prefix() -> String { "/api".into() }
fn default_base_url() -> String { "https://pokeapi.co/api/v2/pokemon".into() }
fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 10 }
fn default_local_id_base() -> i64 { 1_000_000_000 }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from file (defaults when the file is missing), apply env overrides, validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override selected fields from environment-style lookups.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(threads);
        }
        if let Some(url) = lookup("UPSTREAM_BASE_URL") {
            self.upstream.base_url = url;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.upstream.normalize_and_validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if !self.prefix.starts_with('/') {
            return Err(anyhow!("server.prefix must start with '/'"));
        }
        // "/api/" and "/api" mount the same routes
        if self.prefix.len() > 1 {
            self.prefix = self.prefix.trim_end_matches('/').to_string();
        }
        Ok(())
    }
}

impl UpstreamConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("upstream.base_url must start with http:// or https://"));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("upstream timeouts must be positive seconds"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

impl CatalogConfig {
    fn validate(&self) -> Result<()> {
        if self.local_id_base <= 0 {
            return Err(anyhow!("catalog.local_id_base must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_sane() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().expect("defaults validate");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.prefix, "/api");
        assert_eq!(cfg.upstream.base_url, "https://pokeapi.co/api/v2/pokemon");
        assert_eq!(cfg.catalog.local_id_base, 1_000_000_000);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = parse(
            r#"
            [server]
            port = 4000

            [upstream]
            base_url = "http://localhost:9999/pokemon/"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.upstream.request_timeout_secs, 10);

        let mut cfg = cfg;
        cfg.normalize_and_validate().expect("validate");
        assert_eq!(cfg.upstream.base_url, "http://localhost:9999/pokemon");
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [("PORT", "4000"), ("UPSTREAM_BASE_URL", "http://up.test")]
            .into_iter()
            .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.upstream.base_url, "http://up.test");
    }

    #[test]
    fn rejects_invalid_values() {
        let mut cfg = AppConfig::default();
        cfg.upstream.base_url = "ftp://nope".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.catalog.local_id_base = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.prefix = "api".into();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
