use crate::error::{config_error, env_error, RosterResult};
use crate::roster::breaks::BreakThresholds;
use crate::roster::models::{Day, DayMap};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::{info, warn};

/// Default location of the editor defaults file
pub const DEFAULT_DEFAULTS_FILE: &str = "config/roster.toml";

/// Default port of the HTTP service
pub const DEFAULT_PORT: u16 = 3000;

/// Editor defaults applied to a fresh roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterDefaults {
    /// Roles offered for shifts
    pub roles: Vec<String>,
    /// Opening time per day (HH:MM)
    pub start_times: DayMap<String>,
    /// Closing time per day (HH:MM)
    pub end_times: DayMap<String>,
    /// Minimum shift hours per break code
    pub break_min_hours: BreakThresholds,
}

impl Default for RosterDefaults {
    fn default() -> Self {
        let roles = ["Roll", "Nigiri", "Inari", "Service", "Closing"]
            .into_iter()
            .map(String::from)
            .collect();

        let start_times = DayMap::from_fn(|day| match day {
            Day::Sun => "08:00".to_string(),
            _ => "07:30".to_string(),
        });

        let end_times = DayMap::from_fn(|day| match day {
            Day::Thu => "19:00".to_string(),
            Day::Sat | Day::Sun => "17:00".to_string(),
            _ => "18:00".to_string(),
        });

        Self {
            roles,
            start_times,
            end_times,
            break_min_hours: BreakThresholds {
                pb: 4.0,
                mb: 5.0,
                pb2: 9.5,
                mb2: 10.0,
            },
        }
    }
}

impl RosterDefaults {
    /// Read defaults from a TOML file, falling back to the built-in values
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                info!("No roster defaults at {}, using built-in values", path.display());
                return Self::default();
            }
        };

        match Self::from_toml(&content) {
            Ok(defaults) => {
                info!("Loaded roster defaults from {}", path.display());
                defaults
            }
            Err(e) => {
                warn!("Ignoring invalid roster defaults in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse defaults from TOML text
    pub fn from_toml(content: &str) -> RosterResult<Self> {
        let defaults: RosterDefaults = toml::from_str(content)?;
        Ok(defaults.with_builtin_times())
    }

    /// Days left out of a partial `[start_times]` or `[end_times]` table keep the built-in time
    fn with_builtin_times(mut self) -> Self {
        let builtin = Self::default();
        for (day, time) in self.start_times.iter_mut() {
            if time.is_empty() {
                *time = builtin.start_times[day].clone();
            }
        }
        for (day, time) in self.end_times.iter_mut() {
            if time.is_empty() {
                *time = builtin.end_times[day].clone();
            }
        }
        self
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP service binds to
    pub bind_addr: IpAddr,
    /// Port the HTTP service listens on
    pub port: u16,
    /// Editor defaults for new rosters
    pub defaults: RosterDefaults,
}

impl Config {
    /// Load configuration from environment and defaults file
    pub fn load() -> RosterResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let bind_addr = env::var("ROSTER_BIND_ADDR")
            .unwrap_or_else(|_| String::from("127.0.0.1"))
            .parse::<IpAddr>()
            .map_err(|_| env_error("ROSTER_BIND_ADDR"))?;

        let port = match env::var("PORT") {
            Ok(port) => port.parse::<u16>().map_err(|_| env_error("PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        let defaults_file = env::var("ROSTER_DEFAULTS_FILE")
            .unwrap_or_else(|_| String::from(DEFAULT_DEFAULTS_FILE));
        let defaults = RosterDefaults::load_from(Path::new(&defaults_file));

        let config = Config {
            bind_addr,
            port,
            defaults,
        };
        config.validate()?;
        Ok(config)
    }

    /// Socket address for the HTTP listener
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    fn validate(&self) -> RosterResult<()> {
        if self.port == 0 {
            return Err(config_error("PORT must not be 0"));
        }
        Ok(())
    }
}
