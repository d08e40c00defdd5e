use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde_json::{json, Value};
use tempfile::TempDir;
use wardrobe_cli::commands::recommend::{self, RecommendArgs};
use wardrobe_cli::commands::{config, doctor};

#[test]
fn config_reports_defaults_with_source_attribution() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.starts_with("effective config"));
        assert!(output.contains("- stylist.provider = disabled (source: default)"));
        assert!(output.contains("- recommend.default_occasion = casual (source: default)"));
        assert!(output.contains("- weather.api_key = <unset> (source: default)"));
    });
}

#[test]
fn config_attributes_env_values_and_redacts_secrets() {
    with_env(
        &[
            ("WARDROBE_STYLIST_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "AIzaSyExampleKey9876"),
            ("WARDROBE_RECOMMEND_MAX_RESULTS", "2"),
        ],
        || {
            let output = config::run();
            assert!(output.contains("- stylist.provider = gemini (source: env (WARDROBE_STYLIST_PROVIDER))"));
            assert!(output.contains("- stylist.api_key = ***9876 (source: env (GEMINI_API_KEY))"));
            assert!(output.contains("- recommend.max_results = 2 (source: env (WARDROBE_RECOMMEND_MAX_RESULTS))"));
            assert!(!output.contains("AIzaSyExampleKey9876"));
        },
    );
}

#[test]
fn doctor_passes_with_default_config() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "expected passing doctor run");

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(check_status(&report, "config_validation"), "pass");
        assert_eq!(check_status(&report, "stylist_readiness"), "skipped");
        assert_eq!(check_status(&report, "weather_readiness"), "skipped");
    });
}

#[test]
fn doctor_reports_ready_ollama_stylist() {
    with_env(
        &[
            ("WARDROBE_STYLIST_PROVIDER", "ollama"),
            ("WARDROBE_STYLIST_BASE_URL", "http://127.0.0.1:11434"),
            ("WARDROBE_STYLIST_MODEL", "llama3.1"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0);

            let report = parse_payload(&result.output);
            assert_eq!(check_status(&report, "stylist_readiness"), "pass");
        },
    );
}

#[test]
fn doctor_fails_when_gemini_key_is_missing() {
    with_env(&[("WARDROBE_STYLIST_PROVIDER", "gemini")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 6, "expected doctor failure code");
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] stylist_readiness:"));
    });
}

#[test]
fn recommend_returns_fallback_advice_without_stylist() {
    let dir = TempDir::new().expect("temp dir");
    let closet = write_closet(
        &dir,
        &json!([
            item("tee", "top", "t-shirt", "white", json!([1.0, 0.0])),
            item("jeans", "bottom", "jeans", "navy", json!([1.0, 0.1])),
            item("kicks", "footwear", "sneaker", "white", json!([0.9, 0.1])),
            item("coat", "outerwear", "wool coat", "camel", json!([0.8, 0.2])),
            {"categoryMain": "top"}
        ]),
    );

    with_env(&[], || {
        let result = recommend::run(RecommendArgs {
            closet: closet.clone(),
            occasion: Some("Casual".to_string()),
            temperature: Some(9.0),
            conditions: Some("light rain".to_string()),
            city: None,
        });
        assert_eq!(result.exit_code, 0, "expected successful recommend run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "ok");

        let data = &payload["data"];
        assert_eq!(data["occasion"], "casual");
        assert_eq!(data["adviceSource"], "repaired_by_fallback");
        assert_eq!(data["advice"]["bestIndex"], 0);
        assert_eq!(data["advice"]["tips"].as_array().map(Vec::len), Some(3));
        assert_eq!(data["rejectedItems"][0]["position"], 4);

        let candidates = data["candidates"].as_array().expect("candidates array");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["outerwear"]["id"], "coat");
        assert!(candidates[0]["top"].get("embedding").is_none());
    });
}

#[test]
fn recommend_without_a_complete_outfit_returns_no_advice() {
    let dir = TempDir::new().expect("temp dir");
    let closet = write_closet(
        &dir,
        &json!({"items": [item("tee", "top", "t-shirt", "white", json!([1.0, 0.0]))]}),
    );

    with_env(&[], || {
        let result = recommend::run(RecommendArgs { closet: closet.clone(), ..Default::default() });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["candidates"], json!([]));
        assert_eq!(payload["data"]["advice"], Value::Null);
        assert_eq!(payload["data"]["weather"]["city"], "Bangalore");
    });
}

#[test]
fn recommend_rejects_unreadable_closet_file() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("missing.json");

    with_env(&[], || {
        let result = recommend::run(RecommendArgs { closet: missing.clone(), ..Default::default() });
        assert_eq!(result.exit_code, 3, "expected input failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "closet_input");
    });
}

#[test]
fn recommend_rejects_closet_that_is_not_a_list() {
    let dir = TempDir::new().expect("temp dir");
    let closet = write_closet(&dir, &json!("not a closet"));

    with_env(&[], || {
        let result = recommend::run(RecommendArgs { closet: closet.clone(), ..Default::default() });
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "closet_input");
    });
}

#[test]
fn recommend_returns_config_failure_for_invalid_env() {
    let dir = TempDir::new().expect("temp dir");
    let closet = write_closet(&dir, &json!([]));

    with_env(&[("WARDROBE_RECOMMEND_MAX_RESULTS", "0")], || {
        let result = recommend::run(RecommendArgs { closet: closet.clone(), ..Default::default() });
        assert_eq!(result.exit_code, 2, "expected config validation failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

fn item(id: &str, main: &str, sub: &str, color: &str, embedding: Value) -> Value {
    json!({
        "id": id,
        "categoryMain": main,
        "categorySub": sub,
        "colors": [color],
        "embedding": embedding,
        "style": [],
        "season": []
    })
}

fn write_closet(dir: &TempDir, closet: &Value) -> PathBuf {
    let path = dir.path().join("closet.json");
    fs::write(&path, closet.to_string()).expect("write closet fixture");
    path
}

fn check_status(report: &Value, name: &str) -> String {
    report["checks"]
        .as_array()
        .and_then(|checks| checks.iter().find(|check| check["name"] == name))
        .and_then(|check| check["status"].as_str())
        .unwrap_or_default()
        .to_string()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "WARDROBE_STYLIST_PROVIDER",
        "WARDROBE_STYLIST_API_KEY",
        "WARDROBE_STYLIST_BASE_URL",
        "WARDROBE_STYLIST_MODEL",
        "WARDROBE_STYLIST_TIMEOUT_SECS",
        "GEMINI_API_KEY",
        "WARDROBE_WEATHER_ENABLED",
        "WARDROBE_WEATHER_API_KEY",
        "WARDROBE_WEATHER_BASE_URL",
        "WARDROBE_WEATHER_DEFAULT_CITY",
        "WARDROBE_WEATHER_TIMEOUT_SECS",
        "OPENWEATHER_API_KEY",
        "WARDROBE_RECOMMEND_DEFAULT_OCCASION",
        "WARDROBE_RECOMMEND_MAX_RESULTS",
        "WARDROBE_SERVER_BIND_ADDRESS",
        "WARDROBE_SERVER_PORT",
        "WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "WARDROBE_LOGGING_LEVEL",
        "WARDROBE_LOGGING_FORMAT",
        "WARDROBE_LOG_LEVEL",
        "WARDROBE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
