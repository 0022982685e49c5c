//! Application configuration loaded from environment variables.
//!
//! Built once at process start and passed by reference into the upstream
//! clients; business logic never reads the environment directly.

use checkout::{GatewayConfig, OrdersConfig};

/// Browser redirect targets for the payment-completion endpoint.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    /// Location for a settled payment; the order-of-record identifier is
    /// appended as `?id=`.
    pub success: String,
    /// Location for any other outcome; a coarse error code is appended as
    /// `?error=`.
    pub failure: String,
}

/// Server and upstream configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` / `PORT` — bind address (default `0.0.0.0:3000`)
/// - `RUST_LOG` — tracing filter directive (default `"info"`)
/// - `CURRENCY` — payment currency (default `"INR"`)
/// - `ORDERS_API_URL` / `ORDERS_ADMIN_TOKEN` — order-of-record admin API
/// - `GATEWAY_API_URL` / `GATEWAY_CLIENT_ID` / `GATEWAY_CLIENT_SECRET` /
///   `GATEWAY_API_VERSION` — payment gateway credentials
/// - `CHECKOUT_SUCCESS_URL` / `CHECKOUT_FAILURE_URL` — redirect targets
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub currency: String,
    pub orders: OrdersConfig,
    pub gateway: GatewayConfig,
    pub redirects: RedirectConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: env_or("RUST_LOG", "info"),
            currency: env_or("CURRENCY", "INR"),
            orders: OrdersConfig {
                base_url: env_or("ORDERS_API_URL", "http://localhost:8081/admin/api"),
                admin_token: env_or("ORDERS_ADMIN_TOKEN", ""),
            },
            gateway: GatewayConfig {
                base_url: env_or("GATEWAY_API_URL", "http://localhost:8082/pg"),
                client_id: env_or("GATEWAY_CLIENT_ID", ""),
                client_secret: env_or("GATEWAY_CLIENT_SECRET", ""),
                api_version: env_or("GATEWAY_API_VERSION", "2022-09-01"),
            },
            redirects: RedirectConfig {
                success: env_or("CHECKOUT_SUCCESS_URL", "/order-success"),
                failure: env_or("CHECKOUT_FAILURE_URL", "/checkout"),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            currency: "INR".to_string(),
            orders: OrdersConfig {
                base_url: "http://localhost:8081/admin/api".to_string(),
                admin_token: String::new(),
            },
            gateway: GatewayConfig {
                base_url: "http://localhost:8082/pg".to_string(),
                client_id: String::new(),
                client_secret: String::new(),
                api_version: "2022-09-01".to_string(),
            },
            redirects: RedirectConfig {
                success: "/order-success".to_string(),
                failure: "/checkout".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.gateway.api_version, "2022-09-01");
        assert_eq!(config.redirects.success, "/order-success");
        assert_eq!(config.redirects.failure, "/checkout");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
