use std::{net::SocketAddr, num::NonZeroUsize, time::Duration};

use clap::Parser;

/// Runtime settings, read from flags or the environment (a `.env` file is
/// loaded first when present).
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Route planning API backed by Google Maps")]
pub struct Config {
    /// Google Maps web services key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL URL; saved routes are kept in memory when unset
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Region bias for address lookups
    #[arg(long, env = "GEOCODE_REGION", default_value = "ua")]
    pub geocode_region: String,

    #[arg(long, env = "GEOCODE_CACHE_SIZE", default_value = "1000")]
    pub geocode_cache_size: NonZeroUsize,

    #[arg(long, env = "GEOCODE_CACHE_TTL_SECS", default_value_t = 3600)]
    pub geocode_cache_ttl_secs: u64,
}

impl Config {
    pub fn geocode_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.geocode_cache_ttl_secs)
    }
}
