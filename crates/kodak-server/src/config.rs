use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

/// Fallback signing secret. Fine for local runs, never for production.
pub const DEV_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub seed_demo: bool,
    /// Mark session cookies `Secure`. Enable when served over HTTPS.
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_key = get("KODAK_SECRET_KEY")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                warn!("KODAK_SECRET_KEY is unset, using the development secret");
                DEV_SECRET.into()
            });
        let db_path = get("KODAK_DB_PATH")
            .unwrap_or_else(|| "instance/kodak.db".into())
            .into();
        let host = get("KODAK_HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port: u16 = get("KODAK_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("KODAK_PORT must be a port number")?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;
        let seed_demo = get("KODAK_SEED_DEMO").is_some_and(|v| flag(&v));
        let cookie_secure = get("KODAK_COOKIE_SECURE").is_some_and(|v| flag(&v));

        Ok(Self {
            secret_key,
            db_path,
            addr,
            seed_demo,
            cookie_secure,
        })
    }
}

fn flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.secret_key, DEV_SECRET);
        assert_eq!(cfg.db_path, PathBuf::from("instance/kodak.db"));
        assert_eq!(cfg.addr.to_string(), "127.0.0.1:5000");
        assert!(!cfg.seed_demo);
        assert!(!cfg.cookie_secure);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("KODAK_SECRET_KEY", "s"),
            ("KODAK_DB_PATH", "/tmp/k.db"),
            ("KODAK_HOST", "0.0.0.0"),
            ("KODAK_PORT", "8080"),
            ("KODAK_SEED_DEMO", "TRUE"),
            ("KODAK_COOKIE_SECURE", "1"),
        ])
        .unwrap();
        assert_eq!(cfg.secret_key, "s");
        assert_eq!(cfg.addr.to_string(), "0.0.0.0:8080");
        assert!(cfg.seed_demo);
        assert!(cfg.cookie_secure);
    }

    #[test]
    fn unrecognised_flag_values_are_off() {
        let cfg = config(&[("KODAK_COOKIE_SECURE", "on-prod"), ("KODAK_SEED_DEMO", "0")]).unwrap();
        assert!(!cfg.cookie_secure);
        assert!(!cfg.seed_demo);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(config(&[("KODAK_PORT", "http")]).is_err());
    }
}
