use space_content_target::types::{ActivityDetail, Audience, Experience, Id, Mbox};
use tracing::trace;

use super::model::{
    strip, AudienceDetails, ExperienceSummary, MergedActivity, MergedOption, Ordination,
    Targeting, VisitorPercentage, ALL_VISITORS, AUDIENCE_NOT_FOUND, WHEN_ACTIVATED,
    WHEN_DEACTIVATED,
};
use super::selector::SelectedActivity;

struct PlacedExperience<'a> {
    experience: &'a Experience,
    position: usize,
    mbox: Option<&'a Mbox>,
}

impl PlacedExperience<'_> {
    fn contains_option(&self, option_local_id: Id) -> bool {
        self.experience
            .option_locations
            .iter()
            .any(|location| location.option_local_id == option_local_id)
    }
}

/// The first mbox, in mbox order, bound to one of the experience's option locations.
fn find_mbox<'a>(experience: &Experience, mboxes: &'a [Mbox]) -> Option<&'a Mbox> {
    mboxes.iter().find(|mbox| {
        experience
            .option_locations
            .iter()
            .any(|location| location.location_local_id == mbox.location_local_id)
    })
}

/// Only the first audience id is resolved.
#[must_use]
pub fn resolve_audience(audience_ids: &[Id], audiences: &[Audience]) -> AudienceDetails {
    let Some(&id) = audience_ids.first() else {
        return AudienceDetails {
            name: ALL_VISITORS.to_owned(),
            id: None,
        };
    };

    let name = audiences.iter().find(|audience| audience.id == id).map_or_else(
        || AUDIENCE_NOT_FOUND.to_owned(),
        |audience| {
            audience
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .or(audience.kind.as_deref())
                .unwrap_or_default()
                .to_owned()
        },
    );

    AudienceDetails { name, id: Some(id) }
}

/// Joins experiences, mboxes and options of one activity into its position ordered options.
#[must_use]
pub fn merge_activity(
    detail: ActivityDetail,
    selected: &SelectedActivity,
    audiences: &[Audience],
) -> MergedActivity {
    let ActivityDetail {
        priority,
        starts_at,
        ends_at,
        experiences,
        locations,
        options,
        extra: mut fields,
    } = detail;
    let kind = &selected.overview.kind;

    let placed: Vec<_> = experiences
        .iter()
        .zip(1..)
        .map(|(experience, position)| PlacedExperience {
            experience,
            position,
            mbox: find_mbox(experience, &locations.mboxes),
        })
        .collect();

    let mut options: Vec<_> = options
        .into_iter()
        .map(|option| {
            let Some(placed) = placed
                .iter()
                .find(|placed| placed.contains_option(option.option_local_id))
            else {
                trace!(
                    "option {} of activity {} has no experience",
                    option.option_local_id,
                    selected.overview.id
                );
                return MergedOption::untargeted(option);
            };

            let audience_ids = if kind.is_experience_targeting() {
                placed.experience.audience_ids.as_slice()
            } else {
                placed.mbox.map_or(&[][..], |mbox| mbox.audience_ids.as_slice())
            };

            let targeting = Targeting {
                audience_details: resolve_audience(audience_ids, audiences),
                ordination: Ordination {
                    priority,
                    position: placed.position,
                },
                experience: ExperienceSummary {
                    experience_local_id: placed.experience.experience_local_id,
                    name: placed.experience.name.clone(),
                    audience_ids: placed.experience.audience_ids.clone(),
                    mbox: placed.mbox.cloned(),
                },
                visitor_percentage: placed
                    .experience
                    .visitor_percentage
                    .clone()
                    .map_or(VisitorPercentage::NotAvailable, VisitorPercentage::Share),
            };
            MergedOption::targeted(option, targeting)
        })
        .collect();

    // stable, options without an experience keep their relative order at the end
    options.sort_by_key(|option| option.position().unwrap_or(usize::MAX));

    strip(&mut fields, &["type", "scheduling"]);

    MergedActivity {
        fields,
        priority,
        starts_at: backfill(starts_at, selected.starts_at.as_deref(), WHEN_ACTIVATED),
        ends_at: backfill(ends_at, selected.ends_at.as_deref(), WHEN_DEACTIVATED),
        kind: kind.clone(),
        scheduling: selected.scheduling,
        options,
    }
}

fn backfill(own: Option<String>, overview: Option<&str>, sentinel: &str) -> String {
    own.filter(|date| !date.is_empty())
        .or_else(|| overview.map(ToOwned::to_owned))
        .unwrap_or_else(|| sentinel.to_owned())
}
