use super::normalizer::normalize_code;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute value exactly as the catalog supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawField::Number(value) => Some(*value),
            RawField::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawField::Number(value) => write!(f, "{value}"),
            RawField::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Tire season as stored in vendor feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    /// Accepts the short feed codes (`So`, `Su`, `Wi`, `Ta`) and spelled-out names.
    pub fn from_code(code: &str) -> Option<Self> {
        match normalize_code(code).as_str() {
            "so" | "su" | "summer" | "kesä" => Some(Self::Summer),
            "wi" | "ta" | "winter" | "talvi" => Some(Self::Winter),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Summer => "Summer",
            Self::Winter => "Winter",
        }
    }
}

/// One catalog entry. Every attribute is optional; absence is not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rim_size: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wet_grip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_efficiency: Option<String>,
    #[serde(
        default,
        rename = "dex_rating",
        alias = "user_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_rating: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProductRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn season_kind(&self) -> Option<Season> {
        self.season.as_deref().and_then(Season::from_code)
    }

    /// Size in the familiar `width/profileRrim` notation, when all three parts are present.
    pub fn size_label(&self) -> Option<String> {
        let width = self.width.as_ref()?;
        let profile = self.profile.as_ref()?;
        let rim = self.rim_size.as_ref()?;
        Some(format!("{width}/{profile}R{rim}"))
    }
}
