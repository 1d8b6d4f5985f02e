use std::path::PathBuf;

use estate_core::access::AdminAccessConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; production overrides them through the
/// environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Directory uploaded images are written to and served from `/media`.
    pub media_root: PathBuf,
    /// Seed for the payment simulator. Unset means OS entropy.
    pub payment_seed: Option<u64>,
    /// IP allow-list guarding `/api/v1/admin`.
    pub admin_access: AdminAccessConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                     |
    /// | `MEDIA_ROOT`              | `media`                  |
    /// | `PAYMENT_SIMULATION_SEED` | unset                    |
    /// | `ADMIN_RESTRICTED_ACCESS` | `false`                  |
    /// | `ALLOWED_ADMIN_IPS`       | `127.0.0.1,::1`          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let payment_seed = std::env::var("PAYMENT_SIMULATION_SEED").ok().map(|s| {
            s.parse::<u64>()
                .expect("PAYMENT_SIMULATION_SEED must be a valid u64")
        });

        let restricted = parse_flag(
            &std::env::var("ADMIN_RESTRICTED_ACCESS").unwrap_or_else(|_| "false".into()),
        );
        let allowed =
            std::env::var("ALLOWED_ADMIN_IPS").unwrap_or_else(|_| "127.0.0.1,::1".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            media_root,
            payment_seed,
            admin_access: AdminAccessConfig::from_list(restricted, &allowed),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing_skips_blanks() {
        assert_eq!(
            parse_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("True"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
