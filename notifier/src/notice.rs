//! The Honeybadger notice document and how one gets assembled.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::{NoticeContext, NotifierIdentity, ServerContext};

/// A single backtrace entry. Honeybadger expects the line number as a string.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct BacktraceFrame {
    pub number: String,
    pub file: String,
}

impl BacktraceFrame {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            number: line.to_string(),
            file: file.into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct ErrorNotice {
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    pub backtrace: Vec<BacktraceFrame>,
}

/// The exact document POSTed to the notices endpoint.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct NoticePayload {
    pub notifier: NotifierIdentity,
    pub error: ErrorNotice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerContext>,
}

impl NoticePayload {
    /// Assemble a payload for one reported error. Formatting `message` is the only work done here.
    pub fn build(
        category: Option<&str>,
        message: &dyn fmt::Display,
        frame: BacktraceFrame,
        context: &NoticeContext,
        policy: CategoryPolicy,
    ) -> Self {
        Self {
            notifier: context.notifier.clone(),
            error: ErrorNotice {
                category: policy.apply(category),
                message: message.to_string(),
                backtrace: vec![frame],
            },
            server: context.server.clone(),
        }
    }
}

/// Decides whether an empty category is sent as `"class": ""` or left out.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum CategoryPolicy {
    /// Absent and empty categories both omit `class`.
    #[default]
    OmitEmpty,
    /// Only an absent category omits `class`; an empty one is sent as is.
    Preserve,
}

impl CategoryPolicy {
    pub fn apply(&self, category: Option<&str>) -> Option<String> {
        match (self, category) {
            (_, None) => None,
            (CategoryPolicy::OmitEmpty, Some("")) => None,
            (_, Some(category)) => Some(category.to_owned()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseCategoryPolicyError(String);

impl fmt::Display for ParseCategoryPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} is not a valid category policy", self.0)
    }
}

impl std::error::Error for ParseCategoryPolicyError {}

impl FromStr for CategoryPolicy {
    type Err = ParseCategoryPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "omit-empty" => Ok(CategoryPolicy::OmitEmpty),
            "preserve" => Ok(CategoryPolicy::Preserve),
            invalid => Err(ParseCategoryPolicyError(invalid.to_owned())),
        }
    }
}
