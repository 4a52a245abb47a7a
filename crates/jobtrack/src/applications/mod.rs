//! Application records: one row per job application.

use serde::{Deserialize, Serialize};

pub mod store;
pub mod validate;

pub use store::ApplicationStore;

pub const MAX_TEXT_LEN: usize = 200;
pub const MAX_LINK_LEN: usize = 500;

/// A stored job application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub title: String,
    pub link: Option<String>,
    /// ISO instant at UTC midnight of the application date.
    pub applied_on: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    /// Field value id of type `status`.
    pub status: i64,
    /// Field value id of type `last_step`.
    pub last_step: i64,
    /// Field value id of type `modality`.
    pub modality: Option<i64>,
    /// Server-assigned ISO instant of the last write.
    pub last_updated: String,
    pub notes: String,
}

/// A salary as submitted by a form: either a JSON number or text that may
/// be empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Request body for creating or replacing an application.
///
/// `last_updated` is accepted for compatibility with clients that echo the
/// whole record back, but is never used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub applied_on: Option<String>,
    #[serde(default)]
    pub salary_min: Option<NumericInput>,
    #[serde(default)]
    pub salary_max: Option<NumericInput>,
    #[serde(default, alias = "status_id")]
    pub status: Option<i64>,
    #[serde(default, alias = "last_step_id")]
    pub last_step: Option<i64>,
    #[serde(default, alias = "modality_id")]
    pub modality: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
