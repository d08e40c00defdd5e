use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outfits::{SHORTLIST_SIZE, SURFACED_SIZE};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub stylist: StylistConfig,
    pub weather: WeatherConfig,
    pub recommend: RecommendConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StylistConfig {
    pub provider: StylistProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub default_city: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RecommendConfig {
    pub default_occasion: String,
    /// Outfits surfaced per request and sent to the stylist.
    pub max_results: usize,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylistProvider {
    Gemini,
    Ollama,
    Disabled,
}

impl StylistProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub stylist_provider: Option<StylistProvider>,
    pub stylist_model: Option<String>,
    pub stylist_api_key: Option<String>,
    pub weather_enabled: Option<bool>,
    pub weather_api_key: Option<String>,
    pub default_occasion: Option<String>,
    pub max_results: Option<usize>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stylist: StylistConfig {
                provider: StylistProvider::Disabled,
                api_key: None,
                base_url: None,
                model: "gemini-2.5-flash".to_string(),
                timeout_secs: 20,
            },
            weather: WeatherConfig {
                enabled: false,
                api_key: None,
                base_url: "https://api.openweathermap.org".to_string(),
                default_city: "Bangalore".to_string(),
                timeout_secs: 5,
            },
            recommend: RecommendConfig {
                default_occasion: "casual".to_string(),
                max_results: SURFACED_SIZE,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for StylistProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(ConfigError::Validation(format!(
                "unsupported stylist provider `{other}` (expected gemini|ollama|disabled)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("wardrobe.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(stylist) = patch.stylist {
            if let Some(provider) = stylist.provider {
                self.stylist.provider = provider;
            }
            if let Some(api_key) = stylist.api_key {
                self.stylist.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = stylist.base_url {
                self.stylist.base_url = Some(base_url);
            }
            if let Some(model) = stylist.model {
                self.stylist.model = model;
            }
            if let Some(timeout_secs) = stylist.timeout_secs {
                self.stylist.timeout_secs = timeout_secs;
            }
        }

        if let Some(weather) = patch.weather {
            if let Some(enabled) = weather.enabled {
                self.weather.enabled = enabled;
            }
            if let Some(api_key) = weather.api_key {
                self.weather.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = weather.base_url {
                self.weather.base_url = base_url;
            }
            if let Some(default_city) = weather.default_city {
                self.weather.default_city = default_city;
            }
            if let Some(timeout_secs) = weather.timeout_secs {
                self.weather.timeout_secs = timeout_secs;
            }
        }

        if let Some(recommend) = patch.recommend {
            if let Some(default_occasion) = recommend.default_occasion {
                self.recommend.default_occasion = default_occasion;
            }
            if let Some(max_results) = recommend.max_results {
                self.recommend.max_results = max_results;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WARDROBE_STYLIST_PROVIDER") {
            self.stylist.provider = value.parse()?;
        }
        // GEMINI_API_KEY is what most local setups already export
        let stylist_key =
            read_env("WARDROBE_STYLIST_API_KEY").or_else(|| read_env("GEMINI_API_KEY"));
        if let Some(value) = stylist_key {
            self.stylist.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WARDROBE_STYLIST_BASE_URL") {
            self.stylist.base_url = Some(value);
        }
        if let Some(value) = read_env("WARDROBE_STYLIST_MODEL") {
            self.stylist.model = value;
        }
        if let Some(value) = read_env("WARDROBE_STYLIST_TIMEOUT_SECS") {
            self.stylist.timeout_secs = parse_u64("WARDROBE_STYLIST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARDROBE_WEATHER_ENABLED") {
            self.weather.enabled = parse_bool("WARDROBE_WEATHER_ENABLED", &value)?;
        }
        let weather_key =
            read_env("WARDROBE_WEATHER_API_KEY").or_else(|| read_env("OPENWEATHER_API_KEY"));
        if let Some(value) = weather_key {
            self.weather.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WARDROBE_WEATHER_BASE_URL") {
            self.weather.base_url = value;
        }
        if let Some(value) = read_env("WARDROBE_WEATHER_DEFAULT_CITY") {
            self.weather.default_city = value;
        }
        if let Some(value) = read_env("WARDROBE_WEATHER_TIMEOUT_SECS") {
            self.weather.timeout_secs = parse_u64("WARDROBE_WEATHER_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARDROBE_RECOMMEND_DEFAULT_OCCASION") {
            self.recommend.default_occasion = value;
        }
        if let Some(value) = read_env("WARDROBE_RECOMMEND_MAX_RESULTS") {
            self.recommend.max_results = parse_usize("WARDROBE_RECOMMEND_MAX_RESULTS", &value)?;
        }

        if let Some(value) = read_env("WARDROBE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("WARDROBE_SERVER_PORT") {
            self.server.port = parse_u16("WARDROBE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("WARDROBE_LOGGING_LEVEL").or_else(|| read_env("WARDROBE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("WARDROBE_LOGGING_FORMAT").or_else(|| read_env("WARDROBE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(provider) = overrides.stylist_provider {
            self.stylist.provider = provider;
        }
        if let Some(model) = overrides.stylist_model {
            self.stylist.model = model;
        }
        if let Some(api_key) = overrides.stylist_api_key {
            self.stylist.api_key = Some(secret_value(api_key));
        }
        if let Some(enabled) = overrides.weather_enabled {
            self.weather.enabled = enabled;
        }
        if let Some(api_key) = overrides.weather_api_key {
            self.weather.api_key = Some(secret_value(api_key));
        }
        if let Some(default_occasion) = overrides.default_occasion {
            self.recommend.default_occasion = default_occasion;
        }
        if let Some(max_results) = overrides.max_results {
            self.recommend.max_results = max_results;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stylist(&self.stylist)?;
        validate_weather(&self.weather)?;
        validate_recommend(&self.recommend)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("wardrobe.toml"), PathBuf::from("config/wardrobe.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn has_secret(secret: Option<&SecretString>) -> bool {
    secret.is_some_and(|value| !value.expose_secret().trim().is_empty())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn validate_stylist(stylist: &StylistConfig) -> Result<(), ConfigError> {
    if stylist.timeout_secs == 0 || stylist.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "stylist.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    if let Some(base_url) = &stylist.base_url {
        if !is_http_url(base_url) {
            return Err(ConfigError::Validation(
                "stylist.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    match stylist.provider {
        StylistProvider::Gemini => {
            if !has_secret(stylist.api_key.as_ref()) {
                return Err(ConfigError::Validation(
                    "stylist.api_key is required for the gemini provider (or set GEMINI_API_KEY)"
                        .to_string(),
                ));
            }
        }
        StylistProvider::Ollama => {
            let missing =
                stylist.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "stylist.base_url is required for the ollama provider".to_string(),
                ));
            }
        }
        StylistProvider::Disabled => {}
    }

    if stylist.provider != StylistProvider::Disabled && stylist.model.trim().is_empty() {
        return Err(ConfigError::Validation("stylist.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_weather(weather: &WeatherConfig) -> Result<(), ConfigError> {
    if weather.timeout_secs == 0 || weather.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "weather.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    if !weather.enabled {
        return Ok(());
    }

    if !has_secret(weather.api_key.as_ref()) {
        return Err(ConfigError::Validation(
            "weather.api_key is required when weather.enabled is true (or set OPENWEATHER_API_KEY)"
                .to_string(),
        ));
    }
    if !is_http_url(&weather.base_url) {
        return Err(ConfigError::Validation(
            "weather.base_url must start with http:// or https://".to_string(),
        ));
    }
    if weather.default_city.trim().is_empty() {
        return Err(ConfigError::Validation("weather.default_city must not be empty".to_string()));
    }

    Ok(())
}

fn validate_recommend(recommend: &RecommendConfig) -> Result<(), ConfigError> {
    if recommend.max_results == 0 || recommend.max_results > SHORTLIST_SIZE {
        return Err(ConfigError::Validation(format!(
            "recommend.max_results must be in range 1..={SHORTLIST_SIZE}"
        )));
    }

    if recommend.default_occasion.trim().is_empty() {
        return Err(ConfigError::Validation(
            "recommend.default_occasion must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid_override(key, value)),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    stylist: Option<StylistPatch>,
    weather: Option<WeatherPatch>,
    recommend: Option<RecommendPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StylistPatch {
    provider: Option<StylistProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherPatch {
    enabled: Option<bool>,
    api_key: Option<String>,
    base_url: Option<String>,
    default_city: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendPatch {
    default_occasion: Option<String>,
    max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, StylistProvider};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const WARDROBE_VARS: &[&str] = &[
        "WARDROBE_STYLIST_PROVIDER",
        "WARDROBE_STYLIST_API_KEY",
        "GEMINI_API_KEY",
        "WARDROBE_WEATHER_ENABLED",
        "WARDROBE_WEATHER_API_KEY",
        "OPENWEATHER_API_KEY",
        "WARDROBE_RECOMMEND_MAX_RESULTS",
        "WARDROBE_LOG_LEVEL",
        "WARDROBE_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_need_no_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.stylist.provider == StylistProvider::Disabled, "stylist is off by default")?;
        ensure(!config.weather.enabled, "weather lookup is off by default")?;
        ensure(config.recommend.default_occasion == "casual", "default occasion is casual")?;
        ensure(config.recommend.max_results == 3, "three outfits are surfaced by default")?;
        ensure(config.weather.default_city == "Bangalore", "default city")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        env::set_var("TEST_WARDROBE_GEMINI_KEY", "gm-from-env");
        env::set_var("TEST_WARDROBE_WEATHER_KEY", "ow-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("wardrobe.toml");
            fs::write(
                &path,
                r#"
[stylist]
provider = "gemini"
api_key = "${TEST_WARDROBE_GEMINI_KEY}"

[weather]
enabled = true
api_key = "${TEST_WARDROBE_WEATHER_KEY}"
default_city = "Oslo"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let stylist_key = config.stylist.api_key.as_ref().map(|key| key.expose_secret());
            ensure(stylist_key == Some("gm-from-env"), "stylist key should come from env")?;
            let weather_key = config.weather.api_key.as_ref().map(|key| key.expose_secret());
            ensure(weather_key == Some("ow-from-env"), "weather key should come from env")?;
            ensure(config.weather.default_city == "Oslo", "city should come from file")?;
            Ok(())
        })();

        clear_vars(&["TEST_WARDROBE_GEMINI_KEY", "TEST_WARDROBE_WEATHER_KEY"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        env::remove_var("TEST_WARDROBE_UNSET");

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("wardrobe.toml");
        fs::write(&path, "[stylist]\napi_key = \"${TEST_WARDROBE_UNSET}\"\n")
            .map_err(|err| err.to_string())?;

        let outcome = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(outcome, Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "TEST_WARDROBE_UNSET"),
            "unset interpolation variable should be named",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        env::set_var("WARDROBE_LOG_LEVEL", "warn");
        env::set_var("WARDROBE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["WARDROBE_LOG_LEVEL", "WARDROBE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        env::set_var("WARDROBE_RECOMMEND_MAX_RESULTS", "2");
        env::set_var("WARDROBE_STYLIST_API_KEY", "gm-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("wardrobe.toml");
            fs::write(
                &path,
                r#"
[stylist]
provider = "gemini"
api_key = "gm-from-file"
model = "gemini-from-file"

[recommend]
max_results = 4
default_occasion = "office"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    stylist_model: Some("gemini-override".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.stylist.model == "gemini-override", "override model should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.recommend.max_results == 2, "env max_results should beat the file")?;
            ensure(config.recommend.default_occasion == "office", "file occasion beats default")?;
            let key = config.stylist.api_key.as_ref().map(|key| key.expose_secret());
            ensure(key == Some("gm-from-env"), "env api key should win over file")?;
            Ok(())
        })();

        clear_vars(&["WARDROBE_RECOMMEND_MAX_RESULTS", "WARDROBE_STYLIST_API_KEY"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        env::set_var("WARDROBE_STYLIST_PROVIDER", "gemini");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("stylist.api_key")
            );
            ensure(has_message, "validation failure should mention stylist.api_key")
        })();

        clear_vars(&["WARDROBE_STYLIST_PROVIDER"]);
        result
    }

    #[test]
    fn max_results_outside_shortlist_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        for max_results in [0, 5] {
            let outcome = AppConfig::load(LoadOptions {
                overrides: ConfigOverrides {
                    max_results: Some(max_results),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            });
            ensure(
                matches!(outcome, Err(ConfigError::Validation(ref m)) if m.contains("max_results")),
                "max_results must stay within the shortlist",
            )?;
        }
        Ok(())
    }

    #[test]
    fn malformed_env_values_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        env::set_var("WARDROBE_WEATHER_ENABLED", "sometimes");
        let outcome = AppConfig::load(LoadOptions::default());
        clear_vars(&["WARDROBE_WEATHER_ENABLED"]);

        ensure(
            matches!(outcome, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "WARDROBE_WEATHER_ENABLED"),
            "bad boolean should be reported with its key",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(WARDROBE_VARS);

        env::set_var("WARDROBE_STYLIST_PROVIDER", "gemini");
        env::set_var("WARDROBE_STYLIST_API_KEY", "gm-secret-value");
        env::set_var("WARDROBE_WEATHER_ENABLED", "true");
        env::set_var("WARDROBE_WEATHER_API_KEY", "ow-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("gm-secret-value"), "debug output should not contain api key")?;
            ensure(
                !debug.contains("ow-secret-value"),
                "debug output should not contain weather key",
            )?;
            Ok(())
        })();

        clear_vars(&[
            "WARDROBE_STYLIST_PROVIDER",
            "WARDROBE_STYLIST_API_KEY",
            "WARDROBE_WEATHER_ENABLED",
            "WARDROBE_WEATHER_API_KEY",
        ]);
        result
    }
}
