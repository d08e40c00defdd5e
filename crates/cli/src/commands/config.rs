use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use toml::Value;
use wardrobe_core::config::{AppConfig, LoadOptions};

/// One effective setting and where its value came from.
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Field {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field::new(
            "stylist.provider",
            config.stylist.provider.as_str(),
            &["WARDROBE_STYLIST_PROVIDER"],
        ),
        Field::new("stylist.model", config.stylist.model.as_str(), &["WARDROBE_STYLIST_MODEL"]),
        Field::new(
            "stylist.base_url",
            config.stylist.base_url.as_deref().unwrap_or("<unset>"),
            &["WARDROBE_STYLIST_BASE_URL"],
        ),
        Field::new(
            "stylist.api_key",
            redact_secret(config.stylist.api_key.as_ref()),
            &["WARDROBE_STYLIST_API_KEY", "GEMINI_API_KEY"],
        ),
        Field::new(
            "stylist.timeout_secs",
            config.stylist.timeout_secs.to_string(),
            &["WARDROBE_STYLIST_TIMEOUT_SECS"],
        ),
        Field::new(
            "weather.enabled",
            config.weather.enabled.to_string(),
            &["WARDROBE_WEATHER_ENABLED"],
        ),
        Field::new(
            "weather.api_key",
            redact_secret(config.weather.api_key.as_ref()),
            &["WARDROBE_WEATHER_API_KEY", "OPENWEATHER_API_KEY"],
        ),
        Field::new(
            "weather.base_url",
            config.weather.base_url.as_str(),
            &["WARDROBE_WEATHER_BASE_URL"],
        ),
        Field::new(
            "weather.default_city",
            config.weather.default_city.as_str(),
            &["WARDROBE_WEATHER_DEFAULT_CITY"],
        ),
        Field::new(
            "weather.timeout_secs",
            config.weather.timeout_secs.to_string(),
            &["WARDROBE_WEATHER_TIMEOUT_SECS"],
        ),
        Field::new(
            "recommend.default_occasion",
            config.recommend.default_occasion.as_str(),
            &["WARDROBE_RECOMMEND_DEFAULT_OCCASION"],
        ),
        Field::new(
            "recommend.max_results",
            config.recommend.max_results.to_string(),
            &["WARDROBE_RECOMMEND_MAX_RESULTS"],
        ),
        Field::new(
            "server.bind_address",
            config.server.bind_address.as_str(),
            &["WARDROBE_SERVER_BIND_ADDRESS"],
        ),
        Field::new("server.port", config.server.port.to_string(), &["WARDROBE_SERVER_PORT"]),
        Field::new(
            "logging.level",
            config.logging.level.as_str(),
            &["WARDROBE_LOGGING_LEVEL", "WARDROBE_LOG_LEVEL"],
        ),
        Field::new(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["WARDROBE_LOGGING_FORMAT", "WARDROBE_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("wardrobe.toml"), PathBuf::from("config/wardrobe.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if config_file_doc.is_some_and(|doc| contains_path(doc, key_path)) {
        let file_path = config_file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Shows at most the last four characters of a configured secret.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let exposed = secret.expose_secret().trim();
    let chars: Vec<char> = exposed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("***{suffix}")
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, redact_secret};

    #[test]
    fn short_secrets_are_fully_redacted() {
        let secret = SecretString::from("abc123".to_string());
        assert_eq!(redact_secret(Some(&secret)), "<redacted>");
        assert_eq!(redact_secret(None), "<unset>");
    }

    #[test]
    fn long_secrets_keep_a_four_character_suffix() {
        let secret = SecretString::from("AIzaSyExampleKey9876".to_string());
        assert_eq!(redact_secret(Some(&secret)), "***9876");
    }

    #[test]
    fn nested_key_paths_resolve_against_the_config_file() {
        let doc: Value = "[stylist]\nmodel = \"gemini-2.5-flash\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "stylist.model"));
        assert!(!contains_path(&doc, "stylist.provider"));
        assert!(!contains_path(&doc, "weather.enabled"));
    }
}
