//! Upstream resource records.
//!
//! Fields the aggregation does not interpret are kept in a flattened
//! passthrough map so they survive into the aggregated response unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub type Id = i64;

/// Activity type as reported by the activity listing, e.g. `ab`, `xt` or `auto_allocate`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct ActivityType(pub String);

impl ActivityType {
    /// The form used in detail urls and error records: underscores removed, lowercase.
    #[must_use]
    pub fn path_segment(&self) -> String {
        self.0.replace('_', "").to_lowercase()
    }

    #[must_use]
    pub fn is_experience_targeting(&self) -> bool {
        self.0 == "xt"
    }

    #[must_use]
    pub fn is_auto_allocate(&self) -> bool {
        self.path_segment() == "autoallocate"
    }
}

impl From<&str> for ActivityType {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Lifetime {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOverview {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub lifetime: Option<Lifetime>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ActivityList {
    #[serde(default)]
    pub activities: Vec<ActivityOverview>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Audience {
    pub id: Id,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AudienceList {
    #[serde(default)]
    pub audiences: Vec<Audience>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct OfferOverview {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct OfferList {
    #[serde(default)]
    pub offers: Vec<OfferOverview>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct OfferDetail {
    pub id: Option<Id>,
    #[serde(default)]
    pub content: Value,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionLocation {
    pub option_local_id: Id,
    pub location_local_id: Id,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub experience_local_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub audience_ids: Vec<Id>,
    #[serde(default)]
    pub option_locations: Vec<OptionLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_percentage: Option<Number>,
}

/// A location of type mbox.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Mbox {
    pub location_local_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub audience_ids: Vec<Id>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Locations {
    #[serde(default)]
    pub mboxes: Vec<Mbox>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOption {
    pub option_local_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<Id>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    #[serde(default)]
    pub priority: i64,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub locations: Locations,
    #[serde(default)]
    pub options: Vec<ActivityOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Returns the response object if it carries the upstream error indicator.
#[must_use]
pub fn upstream_error(response: &Value) -> Option<&Map<String, Value>> {
    response
        .as_object()
        .filter(|object| object.contains_key("error_code") || object.contains_key("errors"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn activity_type_path_segment() {
        assert_eq!(ActivityType::from("auto_allocate").path_segment(), "autoallocate");
        assert!(ActivityType::from("auto_Allocate").is_auto_allocate());
        assert!(ActivityType::from("xt").is_experience_targeting());
        assert!(!ActivityType::from("ab").is_experience_targeting());
    }

    #[test]
    fn error_indicator() {
        assert!(upstream_error(&json!({"error_code": "NotFound", "message": "gone"})).is_some());
        assert!(upstream_error(&json!({"errors": [{"code": "Forbidden"}]})).is_some());
        assert!(upstream_error(&json!({"id": 1, "content": "<p>hi</p>"})).is_none());
        assert!(upstream_error(&json!([1, 2])).is_none());
    }

    #[test]
    fn detail_keeps_unknown_fields() {
        let detail: ActivityDetail = serde_json::from_value(json!({
            "id": 42,
            "name": "Home Promo Banner",
            "state": "approved",
            "priority": 5,
            "options": [{"optionLocalId": 0, "offerId": 7, "name": "Offer2"}],
            "experiences": [],
            "locations": {"mboxes": [], "selectors": []}
        }))
        .unwrap();

        assert_eq!(detail.priority, 5);
        assert_eq!(detail.extra["name"], "Home Promo Banner");
        assert_eq!(detail.extra["state"], "approved");
        assert_eq!(detail.options[0].offer_id, Some(7));
        assert_eq!(detail.options[0].extra["name"], "Offer2");
    }
}
