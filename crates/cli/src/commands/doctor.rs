use intent_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use crate::commands::{build_service, current_thread_runtime, CommandResult};

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

pub const EXIT_CHECK_FAILED: u8 = 1;

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code =
        if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CHECK_FAILED };

    let output = if json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(output) => output,
            Err(error) => {
                return CommandResult::failure(
                    "doctor",
                    "serialization",
                    error.to_string(),
                    EXIT_CHECK_FAILED,
                );
            }
        }
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
                details: format!(
                    "configuration loaded and validated ({:?} backend, model `{}`)",
                    config.gemini.backend, config.gemini.model
                ),
            });
            checks.push(check_model_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "model_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Runs the same probe as the server's health endpoint: one real analysis call.
fn check_model_reachability(config: &AppConfig) -> DoctorCheck {
    let service = match build_service(config) {
        Ok(service) => service,
        Err(error) => {
            return DoctorCheck {
                name: "model_reachability",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "model_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    if runtime.block_on(service.is_healthy()) {
        DoctorCheck {
            name: "model_reachability",
            status: CheckStatus::Pass,
            details: format!("model `{}` answered the health probe", config.gemini.model),
        }
    } else {
        DoctorCheck {
            name: "model_reachability",
            status: CheckStatus::Fail,
            details: format!(
                "model `{}` did not return a usable reply to the health probe",
                config.gemini.model
            ),
        }
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
