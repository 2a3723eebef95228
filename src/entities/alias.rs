// 🌐 Alias - alternate (translated) business names

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AliasType {
    #[default]
    Translation,
}

impl AliasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasType::Translation => "TRANSLATION",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TRANSLATION" => Some(AliasType::Translation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    pub alias: String,
    #[serde(rename = "type")]
    pub alias_type: AliasType,
}

impl Alias {
    pub fn translation(name: impl Into<String>) -> Self {
        Alias {
            alias: name.into(),
            alias_type: AliasType::Translation,
        }
    }
}
