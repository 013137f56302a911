//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Load .env if present, exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Get required env var; error if missing.
pub fn env_req(key: &str) -> anyhow::Result<String> {
    init_env();
    std::env::var(key).map_err(|_| anyhow::anyhow!("missing env var {key}"))
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Boolean-ish env flag: 1/true/yes/on count as set.
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

/// Resolve the database DSN for this service.
pub fn db_url() -> anyhow::Result<String> {
    env_req("DATABASE_URL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_garbage() {
        std::env::set_var("VITRINA_TEST_PORT", "not-a-port");
        assert_eq!(env_parse("VITRINA_TEST_PORT", 8080u16), 8080);
        std::env::remove_var("VITRINA_TEST_PORT");
    }

    #[test]
    fn env_flag_accepts_common_truthy_spellings() {
        for raw in ["1", "true", "YES", "On"] {
            std::env::set_var("VITRINA_TEST_FLAG", raw);
            assert!(env_flag("VITRINA_TEST_FLAG", false), "{raw} should be truthy");
        }
        std::env::set_var("VITRINA_TEST_FLAG", "0");
        assert!(!env_flag("VITRINA_TEST_FLAG", true));
        std::env::remove_var("VITRINA_TEST_FLAG");
    }
}
