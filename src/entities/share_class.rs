// 📈 Share Class + Share Series
//
// Deserialized straight from the filing's "shareClasses" entries; the field
// names on the wire are kept for the API view as well.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClass {
    pub name: String,

    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(rename = "hasMaximumShares", default)]
    pub max_share_flag: bool,

    #[serde(rename = "maxNumberOfShares", default)]
    pub max_shares: Option<i64>,

    #[serde(rename = "hasParValue", default)]
    pub par_value_flag: bool,

    #[serde(rename = "parValue", default)]
    pub par_value: Option<f64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(rename = "hasRightsOrRestrictions", default)]
    pub special_rights_flag: bool,

    #[serde(default)]
    pub series: Vec<ShareSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSeries {
    pub name: String,

    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(rename = "hasMaximumShares", default)]
    pub max_share_flag: bool,

    #[serde(rename = "maxNumberOfShares", default)]
    pub max_shares: Option<i64>,

    #[serde(rename = "hasRightsOrRestrictions", default)]
    pub special_rights_flag: bool,
}
