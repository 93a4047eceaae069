use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;

use crate::auth::credentials::{LockoutScope, normalize_email};
use crate::auth::limits::{MAX_DURATION, RateLimiterConfig};

#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub demo: DemoAccount,
    pub limits: RateLimiterConfig,
    pub lockout_scope: LockoutScope,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub allowed_origin: Option<HeaderValue>,
}

/// The single account the sign-in endpoint accepts.
#[derive(Clone)]
pub struct DemoAccount {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let email = lookup("SIGNIN_DEMO_EMAIL")
            .ok_or_else(|| anyhow::anyhow!("SIGNIN_DEMO_EMAIL environment variable is required"))?;
        let password = lookup("SIGNIN_DEMO_PASSWORD").ok_or_else(|| {
            anyhow::anyhow!("SIGNIN_DEMO_PASSWORD environment variable is required")
        })?;

        let limits = RateLimiterConfig::new(
            parse_or(&lookup, "SIGNIN_MAX_ATTEMPTS", 5)?,
            Duration::from_secs(parse_or(&lookup, "SIGNIN_BLOCK_SECS", 900)?),
            Duration::from_secs(parse_or(&lookup, "SIGNIN_WINDOW_SECS", 300)?),
        )
        .context("Invalid login rate limit settings")?;

        let sweep_interval =
            Duration::from_secs(parse_or(&lookup, "SIGNIN_SWEEP_INTERVAL_SECS", 60)?);
        if sweep_interval.is_zero() {
            anyhow::bail!("SIGNIN_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        let session_ttl =
            Duration::from_secs(parse_or(&lookup, "SIGNIN_SESSION_TTL_SECS", 3600)?);
        if session_ttl.is_zero() || session_ttl > MAX_DURATION {
            anyhow::bail!(
                "SIGNIN_SESSION_TTL_SECS must be between 1 and {}",
                MAX_DURATION.as_secs()
            );
        }

        let allowed_origin = lookup("SIGNIN_ALLOWED_ORIGIN")
            .map(|origin| {
                HeaderValue::from_str(&origin)
                    .with_context(|| format!("Invalid SIGNIN_ALLOWED_ORIGIN: '{}'", origin))
            })
            .transpose()?;

        Ok(Config {
            bind_addr: {
                let port = lookup("SIGNIN_PORT").unwrap_or_else(|| "8080".to_string());
                lookup("SIGNIN_BIND_ADDR").unwrap_or_else(|| format!("0.0.0.0:{}", port))
            },
            demo: DemoAccount {
                email: normalize_email(&email),
                password,
                name: lookup("SIGNIN_DEMO_NAME").unwrap_or_else(|| "Demo User".to_string()),
            },
            limits,
            lockout_scope: parse_or(&lookup, "SIGNIN_LOCKOUT_SCOPE", LockoutScope::Composite)?,
            session_ttl,
            sweep_interval,
            allowed_origin,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}: '{}' ({})", name, raw, e)),
        None => Ok(default),
    }
}
