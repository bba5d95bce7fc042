use core::cmp::Reverse;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use space_content_target::types::{
    upstream_error, ActivityList, Audience, AudienceList, OfferList,
};
use space_content_target::{AccessToken, Resource, TargetApi};
use tracing::debug;

use super::merger::merge_activity;
use super::model::{MergedActivity, SpaceContentEntry, UpstreamFailure, WHEN_ACTIVATED};
use super::offers::resolve_offers;
use super::scheduling::EffectiveDate;
use super::selector::{select_activities, SelectedActivity};
use crate::error::AppError;

#[derive(Debug)]
pub enum SpaceContent {
    /// No activity that is not expired names the space.
    NotFound,
    Entries(Vec<SpaceContentEntry>),
}

async fn fetch_listing<T: TargetApi, L: DeserializeOwned>(
    target: &T,
    token: &AccessToken,
    resource: Resource,
) -> Result<L, AppError> {
    let response = target.fetch(&resource, token).await?;
    if upstream_error(&response).is_some() {
        return Err(AppError::Listing {
            resource: resource.path(),
            error: response,
        });
    }
    Ok(serde_json::from_value(response)?)
}

async fn merge_one<T: TargetApi>(
    target: &T,
    token: &AccessToken,
    selected: &SelectedActivity,
    audiences: &[Audience],
) -> Result<Result<MergedActivity, UpstreamFailure>, AppError> {
    let kind = &selected.overview.kind;
    let response = target
        .fetch(
            &Resource::Activity {
                kind: kind.clone(),
                id: selected.overview.id,
            },
            token,
        )
        .await?;
    if let Some(error) = upstream_error(&response) {
        return Ok(Err(UpstreamFailure::new(
            Some(selected.overview.id),
            kind.path_segment(),
            error.clone(),
        )));
    }
    let detail = serde_json::from_value(response)?;
    Ok(Ok(merge_activity(detail, selected, audiences)))
}

/// Falls back to the end date for activities that start when activated.
fn effective_date(entry: &SpaceContentEntry) -> EffectiveDate {
    if entry.starts_at == WHEN_ACTIVATED {
        EffectiveDate::from_raw(&entry.ends_at)
    } else {
        EffectiveDate::from_raw(&entry.starts_at)
    }
}

/// Collects every activity of `space` with its options and offers, ordered by effective date
/// and then by descending priority.
///
/// Any upstream error record fails the whole space, after all siblings of the failing stage
/// have completed.
pub async fn assemble_space<T: TargetApi>(
    target: &T,
    space: &str,
    now: DateTime<Utc>,
) -> Result<SpaceContent, AppError> {
    let token = target.access_token().await?;

    let (activities, audiences, offers): (ActivityList, AudienceList, OfferList) = tokio::try_join!(
        fetch_listing(target, &token, Resource::approved_activities()),
        fetch_listing(target, &token, Resource::Audiences),
        fetch_listing(target, &token, Resource::Offers),
    )?;
    debug!(
        "listed {} activities, {} audiences, {} offers",
        activities.activities.len(),
        audiences.audiences.len(),
        offers.offers.len()
    );

    let selected = select_activities(&activities.activities, space, now);
    if selected.is_empty() {
        return Ok(SpaceContent::NotFound);
    }
    debug!("selected {} activities", selected.len());

    let merged = try_join_all(
        selected
            .iter()
            .map(|selected| merge_one(target, &token, selected, &audiences.audiences)),
    )
    .await?;

    let mut failures = Vec::new();
    let mut activities = Vec::with_capacity(merged.len());
    for result in merged {
        match result {
            Ok(activity) => activities.push(activity),
            Err(failure) => failures.push(failure),
        }
    }
    if !failures.is_empty() {
        return Err(AppError::Upstream(failures));
    }

    let resolved = try_join_all(
        activities
            .into_iter()
            .map(|activity| resolve_offers(target, &token, activity, &offers.offers)),
    )
    .await?;

    let mut entries = Vec::with_capacity(resolved.len());
    for result in resolved {
        match result {
            Ok(entry) => entries.push(entry),
            Err(offer_failures) => failures.extend(offer_failures),
        }
    }
    if !failures.is_empty() {
        return Err(AppError::Upstream(failures));
    }

    // stable, ties keep the listing order
    entries.sort_by_cached_key(|entry| (effective_date(entry), Reverse(entry.priority)));

    Ok(SpaceContent::Entries(entries))
}
