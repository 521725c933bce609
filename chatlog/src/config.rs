use std::fmt::{self, Display, Formatter};
use std::time::Duration;

const DEFAULT_RECONNECT_ATTEMPTS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Credentials {
    pub twitch_login: Option<String>,
    pub twitch_token: Option<String>,
}
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub channels: Vec<String>,
    pub reconnect_attempts: u64,
    pub connect_timeout_secs: u64,
    pub extra_capabilities: Vec<String>,
    pub credentials: Option<Credentials>,
}
#[derive(Clone, serde::Deserialize)]
struct PartialConfig {
    channels: Option<Vec<String>>,
    reconnect_attempts: Option<u64>,
    connect_timeout_secs: Option<u64>,
    extra_capabilities: Option<Vec<String>>,
    credentials: Option<Credentials>,
}
impl Config {
    pub fn init(path: &str) -> Config {
        log::debug!("Loading config from file '{}'", path);
        let cfg = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) => {
                log::warn!("Failed to read config: {}; Falling back to defaults", err);
                String::new()
            }
        };
        let cfg = Config::parse(&cfg);
        log::info!("Using config: {}", cfg);
        cfg
    }

    pub fn parse(source: &str) -> Config {
        match toml::from_str::<PartialConfig>(source) {
            Ok(value) => value.into(),
            Err(err) => {
                log::warn!("Error while reading config: {}; Falling back to defaults", err);
                Config::default()
            }
        }
    }

    pub fn tmi(&self) -> tmi::Config {
        tmi::Config {
            credentials: match &self.credentials {
                Some(Credentials {
                    twitch_login: Some(login),
                    twitch_token: Some(token),
                }) => tmi::Login::Regular {
                    login: login.clone(),
                    token: token.clone(),
                },
                _ => tmi::Login::Anonymous,
            },
            capabilities: tmi::CapabilitySet::new().with_extra(self.extra_capabilities.iter().cloned()),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}
impl Default for Config {
    fn default() -> Self {
        Config {
            channels: Vec::new(),
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            extra_capabilities: Vec::new(),
            credentials: None,
        }
    }
}
impl From<PartialConfig> for Config {
    fn from(cfg: PartialConfig) -> Config {
        Config {
            channels: cfg.channels.unwrap_or_default(),
            reconnect_attempts: cfg.reconnect_attempts.unwrap_or(DEFAULT_RECONNECT_ATTEMPTS),
            connect_timeout_secs: cfg.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            extra_capabilities: cfg.extra_capabilities.unwrap_or_default(),
            credentials: cfg.credentials,
        }
    }
}
impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config {{")?;
        writeln!(f, "\tchannels = {:?},", self.channels)?;
        writeln!(f, "\treconnect_attempts = {},", self.reconnect_attempts)?;
        writeln!(f, "\tconnect_timeout_secs = {},", self.connect_timeout_secs)?;
        writeln!(f, "\textra_capabilities = {:?},", self.extra_capabilities)?;
        writeln!(f, "\tcredentials = ...,")?;
        write!(f, "}}")
    }
}
