//! Records the aggregated response is made of.
//!
//! Passthrough maps are flattened next to the derived fields, so keys the derived fields
//! occupy are removed from the passthrough maps before serialization.

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use space_content_target::types::{ActivityOption, ActivityType, Id, Mbox};

use super::scheduling::Scheduling;

pub const ALL_VISITORS: &str = "ALL VISITORS";
pub const AUDIENCE_NOT_FOUND: &str = "AUDIENCE NOT FOUND";
pub const WHEN_ACTIVATED: &str = "when activated";
pub const WHEN_DEACTIVATED: &str = "when deactivated";
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AudienceDetails {
    pub name: String,
    pub id: Option<Id>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ordination {
    pub priority: i64,
    pub position: usize,
}

/// The part of an experience that is repeated on each of its options.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSummary {
    pub experience_local_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub audience_ids: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbox: Option<Mbox>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisitorPercentage {
    Share(Number),
    NotAvailable,
}

impl Serialize for VisitorPercentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Share(share) => share.serialize(serializer),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Targeting {
    pub audience_details: AudienceDetails,
    pub ordination: Ordination,
    pub experience: ExperienceSummary,
    pub visitor_percentage: VisitorPercentage,
}

/// An option joined with its experience. Options without an experience carry no targeting.
#[derive(Serialize, Clone, Debug)]
pub struct MergedOption {
    #[serde(flatten)]
    pub option: ActivityOption,
    #[serde(flatten)]
    pub targeting: Option<Targeting>,
}

impl MergedOption {
    pub(crate) fn targeted(mut option: ActivityOption, targeting: Targeting) -> Self {
        strip(
            &mut option.extra,
            &["audienceDetails", "ordination", "experience", "visitorPercentage"],
        );
        Self {
            option,
            targeting: Some(targeting),
        }
    }

    pub(crate) const fn untargeted(option: ActivityOption) -> Self {
        Self {
            option,
            targeting: None,
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.targeting
            .as_ref()
            .map(|targeting| targeting.ordination.position)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingSnapshot {
    pub status: Scheduling,
    pub starts_at: String,
    pub ends_at: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TypeTag {
    pub activity: ActivityType,
    pub offer: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct OfferContent {
    pub id: Option<Id>,
    pub content: Value,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOption {
    #[serde(flatten)]
    pub option: MergedOption,
    pub scheduling: SchedulingSnapshot,
    #[serde(rename = "type")]
    pub kind: TypeTag,
    pub offer_details: OfferContent,
}

impl EnrichedOption {
    pub(crate) fn new(
        mut option: MergedOption,
        scheduling: SchedulingSnapshot,
        kind: TypeTag,
        offer_details: OfferContent,
    ) -> Self {
        strip(&mut option.option.extra, &["scheduling", "type", "offerDetails"]);
        Self {
            option,
            scheduling,
            kind,
            offer_details,
        }
    }
}

/// One activity of the space. `fields` holds the remaining activity detail fields.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry<O> {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub priority: i64,
    pub starts_at: String,
    pub ends_at: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub scheduling: Scheduling,
    pub options: Vec<O>,
}

impl<O> ActivityEntry<O> {
    pub(crate) fn with_options<P>(self, options: Vec<P>) -> ActivityEntry<P> {
        ActivityEntry {
            fields: self.fields,
            priority: self.priority,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            kind: self.kind,
            scheduling: self.scheduling,
            options,
        }
    }
}

pub type MergedActivity = ActivityEntry<MergedOption>;
pub type SpaceContentEntry = ActivityEntry<EnrichedOption>;

/// Error record of a failed activity or offer fetch, tagged with what was fetched.
#[derive(Serialize, Clone, Debug)]
pub struct UpstreamFailure {
    pub id: Option<Id>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub error: Map<String, Value>,
}

impl UpstreamFailure {
    #[must_use]
    pub fn new(id: Option<Id>, kind: String, mut error: Map<String, Value>) -> Self {
        strip(&mut error, &["id", "type"]);
        Self { id, kind, error }
    }
}

pub(crate) fn strip(map: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        map.remove(*key);
    }
}
