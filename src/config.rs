use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Public base URL the checkout redirect URLs are templated from.
    pub base_url: String,
    pub payment_provider_url: String,
    pub platform_fee_pct: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let base_url = env_map
            .get("BASE_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("BASE_URL".to_string()))?;

        let payment_provider_url = env_map
            .get("PAYMENT_PROVIDER_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("PAYMENT_PROVIDER_URL".to_string()))?;

        let platform_fee_pct = Decimal::from_str(
            env_map
                .get("PLATFORM_FEE_PCT")
                .map(|s| s.as_str())
                .unwrap_or("0.05"),
        )
        .map_err(|_| {
            ConfigError::InvalidValue(
                "PLATFORM_FEE_PCT".to_string(),
                "must be a valid decimal".to_string(),
            )
        })?;
        if platform_fee_pct < Decimal::ZERO || platform_fee_pct >= Decimal::ONE {
            return Err(ConfigError::InvalidValue(
                "PLATFORM_FEE_PCT".to_string(),
                "must be in [0, 1)".to_string(),
            ));
        }

        Ok(Config {
            port,
            database_path,
            base_url,
            payment_provider_url,
            platform_fee_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map.insert(
            "BASE_URL".to_string(),
            "https://backline.example".to_string(),
        );
        map.insert(
            "PAYMENT_PROVIDER_URL".to_string(),
            "https://payments.example".to_string(),
        );
        map
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_env_map(setup_required_env()).expect("config failed");
        assert_eq!(config.port, 8080);
        assert_eq!(config.platform_fee_pct, Decimal::from_str("0.05").unwrap());
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_base_url() {
        let mut env_map = setup_required_env();
        env_map.remove("BASE_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "BASE_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_payment_provider_url() {
        let mut env_map = setup_required_env();
        env_map.remove("PAYMENT_PROVIDER_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "PAYMENT_PROVIDER_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_platform_fee() {
        let mut env_map = setup_required_env();
        env_map.insert("PLATFORM_FEE_PCT".to_string(), "1.5".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PLATFORM_FEE_PCT"),
            _ => panic!("Expected InvalidValue error"),
        }

        let mut env_map = setup_required_env();
        env_map.insert("PLATFORM_FEE_PCT".to_string(), "five percent".to_string());
        assert!(Config::from_env_map(env_map).is_err());
    }
}
