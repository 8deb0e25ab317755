use std::env;

use anyhow::Context;

pub const DEFAULT_TIMETABLE_BASE_URL: &str =
    "https://raw.githubusercontent.com/hyuabot-developers/hyuabot-bus-timetable/main";
pub const DEFAULT_GBIS_BASE_URL: &str = "http://openapi.gbis.go.kr/ws/rest";
pub const DEFAULT_GBIS_SERVICE_KEY: &str = "1234567890";

// Route names the upstream timetable repository does not serve.
const DEFAULT_EXCLUDED_ROUTES: [&str; 4] = ["62", "9090", "110", "707"];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub master_database_url: Option<String>,
    pub timetable_base_url: String,
    pub excluded_routes: Vec<String>,
    pub gbis_base_url: String,
    pub gbis_service_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            master_database_url: env::var("MASTER_DATABASE_URL").ok(),
            timetable_base_url: env::var("TIMETABLE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TIMETABLE_BASE_URL.to_string()),
            excluded_routes: env::var("EXCLUDED_ROUTES")
                .map(|raw| parse_excluded_routes(&raw))
                .unwrap_or_else(|_| {
                    DEFAULT_EXCLUDED_ROUTES
                        .iter()
                        .map(|name| name.to_string())
                        .collect()
                }),
            gbis_base_url: env::var("GBIS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GBIS_BASE_URL.to_string()),
            gbis_service_key: env::var("GBIS_SERVICE_KEY")
                .unwrap_or_else(|_| DEFAULT_GBIS_SERVICE_KEY.to_string()),
        })
    }
}

pub fn parse_excluded_routes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
