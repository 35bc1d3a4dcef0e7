pub mod analytics;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod income;
pub mod products;
pub mod seed;
pub mod stock;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

use partsdesk_core::config::{AppConfig, LoadOptions};
use partsdesk_core::errors::{ApplicationError, InterfaceError};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps an application error through the interface layer so the error
    /// class and exit code are the same for every command.
    pub fn from_application_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = format!("{command}-{}", Utc::now().timestamp_millis());
        let interface = error.into_interface(correlation_id);
        let exit_code = match interface {
            InterfaceError::BadRequest { .. } => 5,
            InterfaceError::Forbidden { .. } => 6,
            InterfaceError::ServiceUnavailable { .. } => 4,
            InterfaceError::Internal { .. } => 1,
        };
        Self::failure(command, interface.error_class(), interface.to_string(), exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}
