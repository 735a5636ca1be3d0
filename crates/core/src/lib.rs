pub mod aggregate;
pub mod chart;
pub mod client;
pub mod domain;
pub mod loader;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    use crate::loader::messages::Locale;

    const DEFAULT_MARKET_UTC_OFFSET_HOURS: i32 = 7;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub api_base_url: Option<String>,
        pub locale: Locale,
        pub market_utc_offset_hours: i32,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let locale = match std::env::var("STOCKDESK_LOCALE") {
                Ok(s) => s
                    .parse::<Locale>()
                    .with_context(|| format!("invalid STOCKDESK_LOCALE: {s}"))?,
                Err(_) => Locale::default(),
            };

            let market_utc_offset_hours = match std::env::var("MARKET_UTC_OFFSET_HOURS") {
                Ok(s) => s
                    .trim()
                    .parse::<i32>()
                    .with_context(|| format!("invalid MARKET_UTC_OFFSET_HOURS: {s}"))?,
                Err(_) => DEFAULT_MARKET_UTC_OFFSET_HOURS,
            };
            anyhow::ensure!(
                (-12..=14).contains(&market_utc_offset_hours),
                "MARKET_UTC_OFFSET_HOURS must be -12..=14 (got {market_utc_offset_hours})"
            );

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                api_base_url: std::env::var("STOCKDESK_API_BASE_URL").ok(),
                locale,
                market_utc_offset_hours,
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_api_base_url(&self) -> anyhow::Result<&str> {
            self.api_base_url
                .as_deref()
                .context("STOCKDESK_API_BASE_URL is required")
        }
    }
}
