use serde::Serialize;
use wardrobe_agent::{advice_generator_from_config, weather_source_from_config};
use wardrobe_core::config::{AppConfig, LoadOptions, StylistProvider};

use super::{escape_json, CommandResult, EXIT_DOCTOR_FAILED};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { EXIT_DOCTOR_FAILED } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_stylist(&config));
            checks.push(check_weather(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["stylist_readiness", "weather_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // Skipped checks are opt-out collaborators, not failures.
    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_stylist(config: &AppConfig) -> DoctorCheck {
    if config.stylist.provider == StylistProvider::Disabled {
        return DoctorCheck {
            name: "stylist_readiness",
            status: CheckStatus::Skipped,
            details: "stylist disabled; recommendations use the engine fallback verdict"
                .to_string(),
        };
    }

    match advice_generator_from_config(&config.stylist) {
        Ok(generator) => DoctorCheck {
            name: "stylist_readiness",
            status: CheckStatus::Pass,
            details: format!(
                "{} client ready with model `{}`",
                generator.name(),
                config.stylist.model
            ),
        },
        Err(error) => DoctorCheck {
            name: "stylist_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_weather(config: &AppConfig) -> DoctorCheck {
    match weather_source_from_config(&config.weather) {
        Ok(Some(_)) => DoctorCheck {
            name: "weather_readiness",
            status: CheckStatus::Pass,
            details: format!(
                "weather client ready for `{}` (default city {})",
                config.weather.base_url, config.weather.default_city
            ),
        },
        Ok(None) => DoctorCheck {
            name: "weather_readiness",
            status: CheckStatus::Skipped,
            details: "weather lookup disabled; requests without weather use unknown conditions"
                .to_string(),
        },
        Err(error) => DoctorCheck {
            name: "weather_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
