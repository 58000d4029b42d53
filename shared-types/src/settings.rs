use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Per-field color overrides for the public page. Every value is `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ColorScheme {
    pub background: String,
    pub title: String,
    pub text: String,
    pub field: String,
    pub yes_button: String,
    pub no_button: String,
    pub brand_title: String,
    pub question_numbers: String,
    pub approval_chances: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            title: "#1e40af".to_string(),
            text: "#64748b".to_string(),
            field: "#ffffff".to_string(),
            yes_button: "#059669".to_string(),
            no_button: "#dc2626".to_string(),
            brand_title: "#1e40af".to_string(),
            question_numbers: "#1e40af".to_string(),
            approval_chances: "#1e40af".to_string(),
        }
    }
}

impl ColorScheme {
    /// Field names paired with their values, in display order.
    pub fn fields(&self) -> [(&'static str, &str); 9] {
        [
            ("background", &self.background),
            ("title", &self.title),
            ("text", &self.text),
            ("field", &self.field),
            ("yes_button", &self.yes_button),
            ("no_button", &self.no_button),
            ("brand_title", &self.brand_title),
            ("question_numbers", &self.question_numbers),
            ("approval_chances", &self.approval_chances),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LogoSettings {
    /// Image encoded as a `data:image/...;base64,` URL.
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MessagingSettings {
    /// Country code, area code and number, digits only.
    pub destination: String,
}
