//! Server configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use voxlux_content::domain::track::TrackMap;
use voxlux_world::view::WorldViewConfig;

use crate::error::AppError;

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Course id served with the storytelling track.
    pub storytelling_course_id: String,
    /// Course id served with the podcast track.
    pub podcast_course_id: String,
    /// Intro presentation delay for world views.
    pub intro_delay: Duration,
    /// File backing the process-wide flags.
    pub flags_path: PathBuf,
    /// Database pool size.
    pub db_max_connections: u32,
    /// OTLP collector endpoint; span export is off when unset.
    pub otlp_endpoint: Option<String>,
    /// World sessions unused for this long are evicted.
    pub session_idle_ttl: Duration,
    /// How often idle sessions are swept.
    pub session_sweep_interval: Duration,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or a value
    /// cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".into())
        })?;
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            database_url,
            host: or_default("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 3000)?,
            storytelling_course_id: or_default("STORYTELLING_COURSE_ID", "storytelling"),
            podcast_course_id: or_default("PODCAST_COURSE_ID", "podcast"),
            intro_delay: Duration::from_millis(parse(&lookup, "INTRO_DELAY_MS", 4000)?),
            flags_path: PathBuf::from(or_default("FLAGS_PATH", "voxlux-flags.json")),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            session_idle_ttl: Duration::from_secs(parse(&lookup, "SESSION_IDLE_TTL_SECS", 1800)?),
            session_sweep_interval: Duration::from_secs(parse(&lookup, "SESSION_SWEEP_SECS", 60)?),
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// The course-to-track map.
    #[must_use]
    pub fn track_map(&self) -> TrackMap {
        TrackMap::new(&self.storytelling_course_id, &self.podcast_course_id)
    }

    /// Tunables for mounted world views.
    #[must_use]
    pub fn view_config(&self) -> WorldViewConfig {
        WorldViewConfig {
            intro_delay: self.intro_delay,
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
    }
}
