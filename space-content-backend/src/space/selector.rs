use chrono::{DateTime, Utc};
use space_content_target::types::ActivityOverview;

use super::scheduling::{classify, Scheduling};

/// An activity overview matching the requested space, with its derived schedule.
#[derive(Clone, Debug)]
pub struct SelectedActivity {
    pub overview: ActivityOverview,
    pub scheduling: Scheduling,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

/// Removes all whitespace and lowercases.
#[must_use]
pub fn normalize_space(space: &str) -> String {
    space
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Keeps the activities whose name contains the space and that have not expired.
#[must_use]
pub fn select_activities(
    activities: &[ActivityOverview],
    space: &str,
    now: DateTime<Utc>,
) -> Vec<SelectedActivity> {
    let space = normalize_space(space);
    if space.is_empty() {
        return Vec::new();
    }

    activities
        .iter()
        .filter(|activity| normalize_space(&activity.name).contains(&space))
        .filter_map(|activity| {
            let schedule = classify(activity, now);
            (schedule.status != Scheduling::Expired).then(|| SelectedActivity {
                overview: activity.clone(),
                scheduling: schedule.status,
                starts_at: schedule.starts_at,
                ends_at: schedule.ends_at,
            })
        })
        .collect()
}
