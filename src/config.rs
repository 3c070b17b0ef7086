// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Commission rate applied when `COMMISSION_RATE` is unset or invalid.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub commission_rate: f64,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://academy.db".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let commission_rate = parse_commission_rate(env::var("COMMISSION_RATE").ok().as_deref());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            commission_rate,
            port,
        }
    }
}

/// Reads a commission rate, falling back to the default for anything
/// that is not a finite number in `[0, 1]`.
pub fn parse_commission_rate(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_COMMISSION_RATE;
    };

    match raw.trim().parse::<f64>() {
        Ok(rate) if rate.is_finite() && (0.0..=1.0).contains(&rate) => rate,
        _ => {
            tracing::warn!(
                "Ignoring invalid COMMISSION_RATE {:?}, using {}",
                raw,
                DEFAULT_COMMISSION_RATE
            );
            DEFAULT_COMMISSION_RATE
        }
    }
}
