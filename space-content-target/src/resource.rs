use crate::types::{ActivityType, Id};

/// Every upstream resource the aggregation reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    Activity { kind: ActivityType, id: Id },
    Activities { state: String },
    Offer { kind: String, id: Id },
    Offers,
    Audience { id: Id },
    Audiences,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
    V3,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        }
    }

    #[must_use]
    pub fn accept_header(self) -> String {
        format!("application/vnd.adobe.target.{}+json", self.as_str())
    }
}

impl Resource {
    #[must_use]
    pub fn approved_activities() -> Self {
        Self::Activities {
            state: "approved".to_owned(),
        }
    }

    /// Path below `{api_url}/{tenant_id}`.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Activity { kind, id } => {
                format!("/target/activities/{}/{id}", kind.path_segment())
            }
            Self::Activities { state } => format!("/target/activities/?state={state}"),
            Self::Offer { kind, id } => format!("/target/offers/{kind}/{id}"),
            Self::Offers => "/target/offers/".to_owned(),
            Self::Audience { id } => format!("/target/audiences/{id}"),
            Self::Audiences => "/target/audiences".to_owned(),
        }
    }

    #[must_use]
    pub fn version(&self) -> ApiVersion {
        match self {
            Self::Activity { kind, .. } if kind.is_auto_allocate() => ApiVersion::V1,
            Self::Activity { .. } | Self::Activities { .. } | Self::Offer { .. } | Self::Offers => {
                ApiVersion::V2
            }
            Self::Audience { .. } | Self::Audiences => ApiVersion::V3,
        }
    }
}
