use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, ParseError, TimeZone as _, Utc};
use serde::Serialize;
use space_content_target::types::ActivityOverview;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheduling {
    Live,
    Scheduled,
    Expired,
}

/// Anything carrying a start and an end date.
pub trait ScheduleWindow {
    fn starts_at(&self) -> Option<&str>;
    fn ends_at(&self) -> Option<&str>;
}

impl ScheduleWindow for ActivityOverview {
    fn starts_at(&self) -> Option<&str> {
        non_empty(self.starts_at.as_deref())
            .or_else(|| non_empty(self.lifetime.as_ref()?.start.as_deref()))
    }

    fn ends_at(&self) -> Option<&str> {
        non_empty(self.ends_at.as_deref())
            .or_else(|| non_empty(self.lifetime.as_ref()?.end.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub status: Scheduling,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

// upstream also emits minute precision like 2017-05-02T07:00Z
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses the date formats upstream uses. Dates without an offset are read as UTC.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(raw, format) {
            return Ok(date.with_timezone(&Utc));
        }
    }
    let naive = raw.strip_suffix(&['Z', 'z'][..]).unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(Utc.from_utc_datetime(&date));
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// A missing start counts as started and a missing end as never ending. An unparsable start
/// has not started yet and an unparsable end has not ended yet.
pub fn classify(entity: &impl ScheduleWindow, now: DateTime<Utc>) -> Schedule {
    let start = entity.starts_at();
    let end = entity.ends_at();

    let started = start.map_or(true, |start| parse_date(start).is_ok_and(|start| now >= start));
    let not_ended = end.map_or(true, |end| parse_date(end).is_ok_and(|end| now <= end));
    let ended = end.is_some_and(|end| parse_date(end).is_ok_and(|end| now > end));

    let status = if started && not_ended {
        Scheduling::Live
    } else if ended {
        Scheduling::Expired
    } else {
        Scheduling::Scheduled
    };

    Schedule {
        status,
        starts_at: start.map(ToOwned::to_owned),
        ends_at: end.map(ToOwned::to_owned),
    }
}

/// Sort key for the final ordering, real dates come before anything unparsable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectiveDate {
    At(DateTime<Utc>),
    Undated,
}

impl EffectiveDate {
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        parse_date(raw).map_or(Self::Undated, Self::At)
    }
}
