// config.rs
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub db_max_connections: u32,
    pub cors_origins: Vec<String>,
    // Outbound webhooks
    pub push_webhook_url: Option<String>,
    pub push_webhook_token: Option<String>,
    pub social_webhook_url: Option<String>,
    // Marketplace rules
    pub platform_fee_bps: i64,
    pub dispute_window_hours: i64,
}

impl Config {
    pub fn init() -> Result<Config> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;
        let jwt_maxage = std::env::var("JWT_MAXAGE")
            .context("JWT_MAXAGE must be set")?
            .parse::<i64>()
            .context("JWT_MAXAGE must be a number of minutes")?;

        let port = parse_or("PORT", 8000u16)?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 20u32)?;
        let platform_fee_bps = parse_or("PLATFORM_FEE_BPS", 1000i64)?;
        let dispute_window_hours = parse_or("DISPUTE_WINDOW_HOURS", 48i64)?;

        check_marketplace_rules(platform_fee_bps, dispute_window_hours)?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_maxage,
            port,
            db_max_connections,
            cors_origins,
            push_webhook_url: non_empty_var("PUSH_WEBHOOK_URL"),
            push_webhook_token: non_empty_var("PUSH_WEBHOOK_TOKEN"),
            social_webhook_url: non_empty_var("SOCIAL_WEBHOOK_URL"),
            platform_fee_bps,
            dispute_window_hours,
        })
    }
}

/// Longest dispute window accepted, one year.
pub const MAX_DISPUTE_WINDOW_HOURS: i64 = 24 * 365;

/// A fee of 100% would leave every shift paying nothing.
fn check_marketplace_rules(platform_fee_bps: i64, dispute_window_hours: i64) -> Result<()> {
    if !(0..10_000).contains(&platform_fee_bps) {
        anyhow::bail!("PLATFORM_FEE_BPS must be between 0 and 9999");
    }
    if !(1..=MAX_DISPUTE_WINDOW_HOURS).contains(&dispute_window_hours) {
        anyhow::bail!(
            "DISPUTE_WINDOW_HOURS must be between 1 and {}",
            MAX_DISPUTE_WINDOW_HOURS
        );
    }
    Ok(())
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Config {
        Config {
            database_url: "postgres://localhost/gigmarket_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            db_max_connections: 2,
            cors_origins: vec![],
            push_webhook_url: None,
            push_webhook_token: None,
            social_webhook_url: None,
            platform_fee_bps: 1000,
            dispute_window_hours: 48,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_must_leave_the_worker_something() {
        assert!(check_marketplace_rules(0, 48).is_ok());
        assert!(check_marketplace_rules(9_999, 48).is_ok());
        assert!(check_marketplace_rules(10_000, 48).is_err());
        assert!(check_marketplace_rules(-1, 48).is_err());
    }

    #[test]
    fn dispute_window_is_bounded() {
        assert!(check_marketplace_rules(1000, 1).is_ok());
        assert!(check_marketplace_rules(1000, MAX_DISPUTE_WINDOW_HOURS).is_ok());
        assert!(check_marketplace_rules(1000, 0).is_err());
        assert!(check_marketplace_rules(1000, i64::from(i32::MAX) + 1).is_err());
    }
}
