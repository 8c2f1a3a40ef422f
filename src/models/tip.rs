// Diagnostic tips

use serde::{Deserialize, Serialize};

/// Ordered: `Info < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Tip {
    pub fn new(title: &str, message: &str, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}
