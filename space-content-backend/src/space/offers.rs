use futures_util::future::try_join_all;
use serde_json::{Map, Value};
use space_content_target::types::{upstream_error, ActivityType, OfferDetail, OfferOverview};
use space_content_target::{AccessToken, Resource, TargetApi};
use tracing::debug;

use super::model::{
    EnrichedOption, MergedActivity, MergedOption, OfferContent, SchedulingSnapshot,
    SpaceContentEntry, TypeTag, UpstreamFailure,
};
use crate::error::AppError;

pub const OFFER_NOT_LISTED: &str = "OfferNotListed";

struct OfferContext<'a, T> {
    target: &'a T,
    token: &'a AccessToken,
    offers: &'a [OfferOverview],
    activity: &'a ActivityType,
    scheduling: &'a SchedulingSnapshot,
}

fn not_listed(option: &MergedOption) -> UpstreamFailure {
    let offer_id = option.option.offer_id;
    let mut error = Map::new();
    error.insert("error_code".to_owned(), Value::from(OFFER_NOT_LISTED));
    error.insert(
        "message".to_owned(),
        Value::from(format!(
            "offer {offer_id:?} of option {} is not in the offer listing",
            option.option.option_local_id
        )),
    );
    UpstreamFailure::new(offer_id, "offer".to_owned(), error)
}

async fn resolve_option<T: TargetApi>(
    context: &OfferContext<'_, T>,
    option: MergedOption,
) -> Result<Result<EnrichedOption, UpstreamFailure>, AppError> {
    let Some(offer) = option
        .option
        .offer_id
        .and_then(|offer_id| context.offers.iter().find(|offer| offer.id == offer_id))
    else {
        return Ok(Err(not_listed(&option)));
    };

    let response = context
        .target
        .fetch(
            &Resource::Offer {
                kind: offer.kind.clone(),
                id: offer.id,
            },
            context.token,
        )
        .await?;
    if let Some(error) = upstream_error(&response) {
        return Ok(Err(UpstreamFailure::new(
            Some(offer.id),
            offer.kind.clone(),
            error.clone(),
        )));
    }
    let detail: OfferDetail = serde_json::from_value(response)?;

    Ok(Ok(EnrichedOption::new(
        option,
        context.scheduling.clone(),
        TypeTag {
            activity: context.activity.clone(),
            offer: offer.kind.clone(),
        },
        OfferContent {
            id: detail.id,
            content: detail.content,
        },
    )))
}

/// Fetches the offer of every option concurrently. The options keep their order.
///
/// The outer error aborts the request, the inner one lists every offer that failed upstream.
pub async fn resolve_offers<T: TargetApi>(
    target: &T,
    token: &AccessToken,
    mut activity: MergedActivity,
    offers: &[OfferOverview],
) -> Result<Result<SpaceContentEntry, Vec<UpstreamFailure>>, AppError> {
    let options = core::mem::take(&mut activity.options);
    let scheduling = SchedulingSnapshot {
        status: activity.scheduling,
        starts_at: activity.starts_at.clone(),
        ends_at: activity.ends_at.clone(),
    };
    let context = OfferContext {
        target,
        token,
        offers,
        activity: &activity.kind,
        scheduling: &scheduling,
    };

    let resolved = try_join_all(
        options
            .into_iter()
            .map(|option| resolve_option(&context, option)),
    )
    .await?;

    let (enriched, failures): (Vec<_>, Vec<_>) = resolved.into_iter().partition(Result::is_ok);
    if !failures.is_empty() {
        return Ok(Err(failures.into_iter().filter_map(Result::err).collect()));
    }

    debug!("resolved {} offers", enriched.len());

    let enriched = enriched.into_iter().filter_map(Result::ok).collect();
    Ok(Ok(activity.with_options(enriched)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use space_content_target::error::{HttpError, TargetError};

    use super::*;
    use crate::space::merger::resolve_audience;
    use crate::space::model::{ExperienceSummary, Ordination, Targeting, VisitorPercentage};
    use crate::space::scheduling::Scheduling;

    struct Offers(HashMap<String, Value>);

    impl TargetApi for Offers {
        async fn access_token(&self) -> Result<AccessToken, TargetError> {
            Ok(AccessToken::new("token".to_owned()))
        }

        async fn fetch(
            &self,
            resource: &Resource,
            _token: &AccessToken,
        ) -> Result<Value, TargetError> {
            self.0
                .get(&resource.path())
                .cloned()
                .ok_or_else(|| TargetError::Http(HttpError::UnsupportedUrl(resource.path())))
        }
    }

    fn target() -> Offers {
        Offers(HashMap::from([
            (
                "/target/offers/content/10".to_owned(),
                json!({"id": 10, "name": "Offer B", "content": "<div>B</div>"}),
            ),
            (
                "/target/offers/json/11".to_owned(),
                json!({"id": 11, "content": {"title": "A"}}),
            ),
            (
                "/target/offers/content/12".to_owned(),
                json!({"error_code": "NotFound", "message": "offer 12 not found"}),
            ),
        ]))
    }

    fn listing() -> Vec<OfferOverview> {
        serde_json::from_value(json!([
            {"id": 10, "type": "content"},
            {"id": 11, "type": "json"},
            {"id": 12, "type": "content"}
        ]))
        .unwrap()
    }

    fn option(option_local_id: i64, offer_id: Option<i64>, position: usize) -> MergedOption {
        let option =
            serde_json::from_value(json!({"optionLocalId": option_local_id, "offerId": offer_id}))
                .unwrap();
        MergedOption::targeted(
            option,
            Targeting {
                audience_details: resolve_audience(&[], &[]),
                ordination: Ordination {
                    priority: 1,
                    position,
                },
                experience: ExperienceSummary {
                    experience_local_id: 0,
                    name: None,
                    audience_ids: Vec::new(),
                    mbox: None,
                },
                visitor_percentage: VisitorPercentage::NotAvailable,
            },
        )
    }

    fn activity(options: Vec<MergedOption>) -> MergedActivity {
        MergedActivity {
            fields: Map::new(),
            priority: 1,
            starts_at: "when activated".to_owned(),
            ends_at: "2999-01-01T00:00Z".to_owned(),
            kind: ActivityType::from("ab"),
            scheduling: Scheduling::Live,
            options,
        }
    }

    fn token() -> AccessToken {
        AccessToken::new("token".to_owned())
    }

    #[tokio::test]
    async fn attaches_offer_content() {
        let entry = resolve_offers(
            &target(),
            &token(),
            activity(vec![option(1, Some(11), 1), option(0, Some(10), 2)]),
            &listing(),
        )
        .await
        .unwrap()
        .unwrap();

        let entry = serde_json::to_value(entry).unwrap();
        let options = entry["options"].as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0]["optionLocalId"], 1);
        assert_eq!(
            options[0]["offerDetails"],
            json!({"id": 11, "content": {"title": "A"}})
        );
        assert_eq!(options[0]["type"], json!({"activity": "ab", "offer": "json"}));
        assert_eq!(
            options[0]["scheduling"],
            json!({"status": "live", "startsAt": "when activated", "endsAt": "2999-01-01T00:00Z"})
        );
        assert_eq!(options[1]["offerDetails"]["content"], "<div>B</div>");
        assert_eq!(options[1]["ordination"]["position"], 2);
    }

    #[tokio::test]
    async fn offer_errors_are_collected() {
        let failures = resolve_offers(
            &target(),
            &token(),
            activity(vec![
                option(0, Some(12), 1),
                option(1, Some(10), 2),
                option(2, Some(77), 3),
                option(3, None, 4),
            ]),
            &listing(),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].id, Some(12));
        assert_eq!(failures[0].kind, "content");
        assert_eq!(failures[0].error["error_code"], "NotFound");
        assert_eq!(failures[1].id, Some(77));
        assert_eq!(failures[1].kind, "offer");
        assert_eq!(failures[1].error["error_code"], OFFER_NOT_LISTED);
        assert_eq!(failures[2].id, None);
    }

    #[tokio::test]
    async fn transport_errors_abort() {
        let listing = [OfferOverview {
            id: 13,
            kind: "content".to_owned(),
        }];
        let result = resolve_offers(
            &target(),
            &token(),
            activity(vec![option(0, Some(13), 1)]),
            &listing,
        )
        .await;
        assert!(matches!(result, Err(AppError::Target(_))));
    }
}
