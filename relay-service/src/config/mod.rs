use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default upload ceiling (100 MiB), applied to the buffered file body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Process-wide relay configuration. Built once at start-up and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub upstream: UpstreamConfig,
    pub limits: LimitsConfig,
    pub static_dir: Option<String>,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    /// Model for chat and file analysis (e.g., gemini-2.5-flash)
    pub text_model: String,
    /// Model for image generation (e.g., imagen-3.0-generate-002)
    pub image_model: String,
    /// `None` means calls wait until the upstream replies or the transport fails.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = common_config.is_production();

        let timeout = match env::var("GENAI_UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(parse_number(
                "GENAI_UPSTREAM_TIMEOUT_SECS",
                &raw,
            )?)),
            Err(_) => None,
        };

        let max_upload_bytes = parse_number(
            "RELAY_MAX_UPLOAD_BYTES",
            &get_env(
                "RELAY_MAX_UPLOAD_BYTES",
                Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                is_prod,
            )?,
        )?;

        Ok(RelayConfig {
            common: common_config,
            upstream: UpstreamConfig {
                api_key: Secret::new(get_env("GEMINI_API_KEY", None, is_prod)?),
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_API_BASE), is_prod)?,
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.5-flash"), is_prod)?,
                image_model: get_env(
                    "GENAI_IMAGE_MODEL",
                    Some("imagen-3.0-generate-002"),
                    is_prod,
                )?,
                timeout,
            },
            limits: LimitsConfig { max_upload_bytes },
            static_dir: env::var("RELAY_STATIC_DIR").ok().filter(|s| !s.is_empty()),
            observability: ObservabilityConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a number, got {:?}: {}", key, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_falls_back_to_default_outside_prod() {
        let value = get_env("RELAY_TEST_UNSET_KEY_1", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_requires_value_in_prod() {
        let err = get_env("RELAY_TEST_UNSET_KEY_2", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn get_env_without_default_is_an_error() {
        assert!(get_env("RELAY_TEST_UNSET_KEY_3", None, false).is_err());
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number::<usize>("K", " 42 ").unwrap(), 42);
        assert!(parse_number::<usize>("K", "lots").is_err());
    }
}
