use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub session_ttl_secs: i64,
    pub reset_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 24 * 60 * 60,
            reset_ttl_secs: 15 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub public_base_url: String,
    pub tokens: TokenConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into());
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .trim_end_matches('/')
            .to_string();
        let defaults = TokenConfig::default();
        let tokens = TokenConfig {
            session_ttl_secs: env_secs("SESSION_TTL_SECS").unwrap_or(defaults.session_ttl_secs),
            reset_ttl_secs: env_secs("RESET_TTL_SECS").unwrap_or(defaults.reset_ttl_secs),
        };
        if tokens.session_ttl_secs <= 0 || tokens.reset_ttl_secs <= 0 {
            anyhow::bail!("SESSION_TTL_SECS and RESET_TTL_SECS must be positive");
        }
        Ok(Self {
            data_dir: data_dir.into(),
            public_base_url,
            tokens,
        })
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn restaurants_path(&self) -> PathBuf {
        self.data_dir.join("restaurants.json")
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join("items.json")
    }
}

fn env_secs(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttls_match_session_and_reset_windows() {
        let t = TokenConfig::default();
        assert_eq!(t.session_ttl_secs, 86_400);
        assert_eq!(t.reset_ttl_secs, 900);
    }

    #[test]
    fn collection_paths_live_under_data_dir() {
        let cfg = AppConfig {
            data_dir: "/srv/menuhub".into(),
            public_base_url: "http://localhost:8080".into(),
            tokens: TokenConfig::default(),
        };
        assert_eq!(cfg.users_path(), PathBuf::from("/srv/menuhub/users.json"));
        assert_eq!(cfg.restaurants_path(), PathBuf::from("/srv/menuhub/restaurants.json"));
        assert_eq!(cfg.items_path(), PathBuf::from("/srv/menuhub/items.json"));
    }
}
