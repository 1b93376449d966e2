//! Server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the gateway server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `8080`; `0` for auto-assign in tests).
    pub port: u16,
    /// Interval between "connecting" heartbeat messages in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Country code substituted for a local `0` destination prefix.
    pub country_code: String,
    /// Static asset token sent with the `ready` notification.
    pub ready_asset: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            heartbeat_interval_ms: 1000,
            country_code: wagate_core::address::DEFAULT_COUNTRY_CODE.into(),
            ready_asset: "133187-ready-check.gif".into(),
        }
    }
}

impl ServerConfig {
    /// Load defaults with environment variable overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_env_overrides(&mut config);
        config
    }
}

/// Apply environment variable overrides to a config.
///
/// Parsing is strict: integers must be valid and in range, the country code
/// all digits; invalid values are silently ignored (fall back to the
/// existing value).
pub fn apply_env_overrides(config: &mut ServerConfig) {
    if let Some(v) = env_value("WAGATE_HOST") {
        config.host = v;
    }
    if let Some(v) = env_value("WAGATE_PORT").and_then(|v| parse_u16(&v, 1, 65535)) {
        config.port = v;
    }
    if let Some(v) =
        env_value("WAGATE_HEARTBEAT_INTERVAL_MS").and_then(|v| parse_u64(&v, 10, 600_000))
    {
        config.heartbeat_interval_ms = v;
    }
    if let Some(v) = env_value("WAGATE_COUNTRY_CODE").filter(|v| is_country_code(v)) {
        config.country_code = v;
    }
    if let Some(v) = env_value("WAGATE_READY_ASSET") {
        config.ready_asset = v;
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_u16(value: &str, min: u16, max: u16) -> Option<u16> {
    value.parse::<u16>().ok().filter(|v| (min..=max).contains(v))
}

fn parse_u64(value: &str, min: u64, max: u64) -> Option<u64> {
    value.parse::<u64>().ok().filter(|v| (min..=max).contains(v))
}

fn is_country_code(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_host_and_port() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn default_heartbeat_interval_is_one_second() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.heartbeat_interval_ms, 1000);
    }

    #[test]
    fn default_country_code() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.country_code, "62");
    }

    #[test]
    fn default_ready_asset() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.ready_asset, "133187-ready-check.gif");
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, cfg.host);
        assert_eq!(back.port, cfg.port);
        assert_eq!(back.heartbeat_interval_ms, cfg.heartbeat_interval_ms);
        assert_eq!(back.country_code, cfg.country_code);
        assert_eq!(back.ready_asset, cfg.ready_asset);
    }

    #[test]
    fn parse_u16_in_range() {
        assert_eq!(parse_u16("8080", 1, 65535), Some(8080));
        assert_eq!(parse_u16("1", 1, 65535), Some(1));
    }

    #[test]
    fn parse_u16_rejects_invalid() {
        assert_eq!(parse_u16("0", 1, 65535), None);
        assert_eq!(parse_u16("not-a-port", 1, 65535), None);
        assert_eq!(parse_u16("70000", 1, 65535), None);
        assert_eq!(parse_u16("-1", 1, 65535), None);
    }

    #[test]
    fn parse_u64_enforces_bounds() {
        assert_eq!(parse_u64("1000", 10, 600_000), Some(1000));
        assert_eq!(parse_u64("5", 10, 600_000), None);
        assert_eq!(parse_u64("999999999", 10, 600_000), None);
    }

    #[test]
    fn country_code_must_be_digits() {
        assert!(is_country_code("62"));
        assert!(is_country_code("1"));
        assert!(!is_country_code(""));
        assert!(!is_country_code("+62"));
        assert!(!is_country_code("uk"));
    }

    #[test]
    fn unset_env_leaves_defaults() {
        let mut cfg = ServerConfig::default();
        // None of the WAGATE_* variables are set in the test environment.
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.port, ServerConfig::default().port);
        assert_eq!(cfg.country_code, ServerConfig::default().country_code);
    }
}
