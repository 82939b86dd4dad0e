//! Layered CLI configuration: defaults, then the TOML file named by
//! `DURAK_CONFIG`, then `DURAK_*` environment variables.

use durak_ai::Difficulty;
use durak_engine::cards::Variant;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "DURAK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub variant: Variant,
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
    pub games: u32,
    pub abandon_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub variant: ValueSource,
    pub difficulty: ValueSource,
    pub seed: ValueSource,
    pub games: ValueSource,
    pub abandon_timeout_secs: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            variant: ValueSource::Default,
            difficulty: ValueSource::Default,
            seed: ValueSource::Default,
            games: ValueSource::Default,
            abandon_timeout_secs: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Standard,
            difficulty: Difficulty::Medium,
            seed: None,
            games: 100,
            abandon_timeout_secs: 300,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {e}"),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.variant {
            cfg.variant = parse_variant(&v)?;
            sources.variant = ValueSource::File;
        }
        if let Some(v) = f.difficulty {
            cfg.difficulty = parse_difficulty(&v)?;
            sources.difficulty = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.games {
            cfg.games = v;
            sources.games = ValueSource::File;
        }
        if let Some(v) = f.abandon_timeout_secs {
            cfg.abandon_timeout_secs = v;
            sources.abandon_timeout_secs = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var("DURAK_SEED")
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(variant) = std::env::var("DURAK_VARIANT")
        && !variant.is_empty()
    {
        cfg.variant = parse_variant(&variant)?;
        sources.variant = ValueSource::Env;
    }
    if let Ok(difficulty) = std::env::var("DURAK_DIFFICULTY")
        && !difficulty.is_empty()
    {
        cfg.difficulty = parse_difficulty(&difficulty)?;
        sources.difficulty = ValueSource::Env;
    }
    if let Ok(games) = std::env::var("DURAK_GAMES")
        && !games.is_empty()
    {
        cfg.games = games
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid games".into()))?;
        sources.games = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    games: Option<u32>,
    #[serde(default)]
    abandon_timeout_secs: Option<u64>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.games == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: games must be >=1".into(),
        ));
    }
    if cfg.abandon_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: abandon_timeout_secs must be >0".into(),
        ));
    }
    Ok(())
}

fn parse_variant(s: &str) -> Result<Variant, ConfigError> {
    s.parse().map_err(ConfigError::Invalid)
}

fn parse_difficulty(s: &str) -> Result<Difficulty, ConfigError> {
    s.parse().map_err(ConfigError::Invalid)
}
