/// Posting-time aggregation.
///
/// Reduces a batch of post timestamps into hour-of-day and day-of-week
/// buckets, a day x hour heatmap and the top peak buckets, then shapes the
/// result into an `ActivitySummary`.
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use indexmap::IndexMap;
use tracing::debug;

use crate::summary::{
    ActivitySummary, PeakDay, PeakHour, DAYS_PER_WEEK, HOURS_PER_DAY, MAX_PEAKS,
};
use crate::timestamps::parse_timestamp;

/// One heatmap cell: a UTC weekday and hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    day: Weekday,
    hour: u32,
}

impl TimeSlot {
    /// Build a slot from a day index (0 = Monday) and an hour, or `None` when
    /// either is out of range.
    pub fn new(day: usize, hour: usize) -> Option<Self> {
        let day = u8::try_from(day).ok().and_then(|d| Weekday::try_from(d).ok())?;
        if hour >= HOURS_PER_DAY {
            return None;
        }
        Some(TimeSlot {
            day,
            hour: hour as u32,
        })
    }

    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        TimeSlot {
            day: dt.weekday(),
            hour: dt.hour(),
        }
    }

    pub fn day_index(&self) -> usize {
        self.day.num_days_from_monday() as usize
    }

    pub fn hour_index(&self) -> usize {
        self.hour as usize
    }
}

/// Where the counted posts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Scraped,
    Demo,
}

impl DataOrigin {
    pub fn timezone_note(&self) -> &'static str {
        match self {
            DataOrigin::Scraped => "Times shown in UTC (scraped)",
            DataOrigin::Demo => "Times shown in UTC (demo mode)",
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, DataOrigin::Demo)
    }
}

/// Profile details carried into the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub identifier: String,
    pub display_name: String,
    pub profile_image: String,
}

impl Profile {
    /// Profile with only a handle known: "@handle" and no image.
    pub fn placeholder(identifier: &str) -> Self {
        Profile {
            identifier: identifier.to_string(),
            display_name: format!("@{}", identifier),
            profile_image: String::new(),
        }
    }
}

/// Bucket counters for one aggregation run.
///
/// `record` is the only mutation and bumps every view at once, so hourly,
/// daily, heatmap and total always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCounts {
    hourly: [u32; HOURS_PER_DAY],
    daily: [u32; DAYS_PER_WEEK],
    heatmap: [[u32; HOURS_PER_DAY]; DAYS_PER_WEEK],
    total: u32,
}

impl Default for ActivityCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityCounts {
    pub fn new() -> Self {
        Self {
            hourly: [0; HOURS_PER_DAY],
            daily: [0; DAYS_PER_WEEK],
            heatmap: [[0; HOURS_PER_DAY]; DAYS_PER_WEEK],
            total: 0,
        }
    }

    pub fn record(&mut self, slot: TimeSlot) {
        let (day, hour) = (slot.day_index(), slot.hour_index());
        self.hourly[hour] += 1;
        self.daily[day] += 1;
        self.heatmap[day][hour] += 1;
        self.total += 1;
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn hourly(&self) -> &[u32; HOURS_PER_DAY] {
        &self.hourly
    }

    pub fn daily(&self) -> &[u32; DAYS_PER_WEEK] {
        &self.daily
    }

    pub fn cell(&self, slot: TimeSlot) -> u32 {
        self.heatmap[slot.day_index()][slot.hour_index()]
    }

    pub fn peak_hours(&self) -> Vec<PeakHour> {
        rank_peaks(&self.hourly)
            .into_iter()
            .map(|(hour, count)| PeakHour {
                hour: hour as u32,
                count,
            })
            .collect()
    }

    pub fn peak_days(&self) -> Vec<PeakDay> {
        rank_peaks(&self.daily)
            .into_iter()
            .map(|(day, count)| PeakDay {
                day: day as u32,
                count,
            })
            .collect()
    }
}

/// Result of reducing a batch of instants.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub counts: ActivityCounts,
    pub last_post_time: Option<DateTime<Utc>>,
}

impl Aggregation {
    pub fn into_summary(self, profile: &Profile, origin: DataOrigin) -> ActivitySummary {
        build_summary(&self.counts, profile, origin, self.last_post_time)
    }
}

/// Count instants into hour, day and heatmap buckets.
///
/// Returns `None` when there is nothing to count.
pub fn aggregate(instants: &[DateTime<Utc>]) -> Option<Aggregation> {
    if instants.is_empty() {
        return None;
    }

    let mut counts = ActivityCounts::new();
    for instant in instants {
        counts.record(TimeSlot::from_datetime(instant));
    }

    Some(Aggregation {
        counts,
        last_post_time: instants.iter().max().copied(),
    })
}

/// Parse raw timestamp strings and aggregate the ones that parse.
///
/// Unparseable entries are dropped. If none survive, returns `None`, same as
/// an empty batch.
pub fn aggregate_raw<S: AsRef<str>>(raw: &[S]) -> Option<Aggregation> {
    let instants: Vec<DateTime<Utc>> = raw
        .iter()
        .filter_map(|entry| {
            let parsed = parse_timestamp(entry.as_ref());
            if parsed.is_none() {
                debug!("Dropping unparseable timestamp: {:?}", entry.as_ref());
            }
            parsed
        })
        .collect();

    if instants.len() < raw.len() {
        debug!("Parsed {} of {} timestamps", instants.len(), raw.len());
    }

    aggregate(&instants)
}

/// Shape counters into the response record.
pub fn build_summary(
    counts: &ActivityCounts,
    profile: &Profile,
    origin: DataOrigin,
    last_post_time: Option<DateTime<Utc>>,
) -> ActivitySummary {
    let hourly: IndexMap<String, u32> = counts
        .hourly
        .iter()
        .enumerate()
        .map(|(hour, &count)| (hour.to_string(), count))
        .collect();

    let daily: IndexMap<String, u32> = counts
        .daily
        .iter()
        .enumerate()
        .map(|(day, &count)| (day.to_string(), count))
        .collect();

    ActivitySummary {
        identifier: profile.identifier.clone(),
        display_name: profile.display_name.clone(),
        profile_image: profile.profile_image.clone(),
        total_count: counts.total,
        hourly,
        daily,
        heatmap: counts.heatmap.iter().map(|row| row.to_vec()).collect(),
        peak_hours: counts.peak_hours(),
        peak_days: counts.peak_days(),
        timezone_note: origin.timezone_note().to_string(),
        is_demo: origin.is_demo(),
        last_post_time: last_post_time.map(|dt| dt.to_rfc3339()),
    }
}

/// Top buckets by count, descending. Ties keep bucket order; empty buckets
/// never make the list.
fn rank_peaks(counts: &[u32]) -> Vec<(usize, u32)> {
    let mut ranked: Vec<(usize, u32)> = counts.iter().copied().enumerate().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .filter(|&(_, count)| count > 0)
        .take(MAX_PEAKS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarize(raw: &[&str]) -> Option<ActivitySummary> {
        aggregate_raw(raw)
            .map(|agg| agg.into_summary(&Profile::placeholder("tester"), DataOrigin::Scraped))
    }

    fn assert_totals_agree(summary: &ActivitySummary) {
        let hourly: u32 = summary.hourly.values().sum();
        let daily: u32 = summary.daily.values().sum();
        let heatmap: u32 = summary.heatmap.iter().flatten().sum();
        assert_eq!(hourly, summary.total_count);
        assert_eq!(daily, summary.total_count);
        assert_eq!(heatmap, summary.total_count);
    }

    #[test]
    fn test_empty_input_has_no_summary() {
        let empty: [&str; 0] = [];
        assert!(summarize(&empty).is_none());
        assert!(aggregate(&[]).is_none());
    }

    #[test]
    fn test_unparseable_only_has_no_summary() {
        assert!(summarize(&["not-a-date"]).is_none());
        assert!(summarize(&["", "garbage", "2024-99-01"]).is_none());
    }

    #[test]
    fn test_mixed_valid_and_invalid() {
        let summary = summarize(&[
            "2024-01-01T09:00:00Z",
            "garbage",
            "2024-01-01T09:30:00Z",
        ])
        .unwrap();

        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.hourly["9"], 2);
        for (hour, count) in &summary.hourly {
            if hour != "9" {
                assert_eq!(*count, 0, "hour {} should be empty", hour);
            }
        }
        assert_eq!(summary.daily["0"], 2);
        assert_eq!(summary.heatmap[0][9], 2);
        assert_totals_agree(&summary);
        summary.validate().unwrap();
    }

    #[test]
    fn test_all_keys_present_for_sparse_input() {
        let summary = summarize(&["2024-06-15T12:00:00Z"]).unwrap();
        assert_eq!(summary.hourly.len(), 24);
        assert_eq!(summary.daily.len(), 7);
        let hour_keys: Vec<&str> = summary.hourly.keys().map(|k| k.as_str()).collect();
        assert_eq!(hour_keys[0], "0");
        assert_eq!(hour_keys[23], "23");
        assert_eq!(summary.heatmap.len(), 7);
        assert!(summary.heatmap.iter().all(|row| row.len() == 24));
    }

    #[test]
    fn test_zulu_and_offset_share_bucket() {
        let zulu = summarize(&["2024-01-05T22:10:00Z"]).unwrap();
        let offset = summarize(&["2024-01-05T22:10:00+00:00"]).unwrap();
        assert_eq!(zulu.hourly, offset.hourly);
        assert_eq!(zulu.daily, offset.daily);
        assert_eq!(zulu.heatmap, offset.heatmap);
    }

    #[test]
    fn test_heatmap_cells_match_instants() {
        let raw = [
            "2024-01-01T00:00:00Z", // Mon 0
            "2024-01-01T00:59:59Z", // Mon 0
            "2024-01-02T13:00:00Z", // Tue 13
            "2024-01-07T23:00:00Z", // Sun 23
            "2024-01-06T08:00:00-02:00", // Sat 10 UTC
        ];
        let agg = aggregate_raw(&raw[..]).unwrap();

        for day in 0..DAYS_PER_WEEK {
            for hour in 0..HOURS_PER_DAY {
                let slot = TimeSlot::new(day, hour).unwrap();
                let expected = match (day, hour) {
                    (0, 0) => 2,
                    (1, 13) | (6, 23) | (5, 10) => 1,
                    _ => 0,
                };
                assert_eq!(agg.counts.cell(slot), expected, "cell [{}][{}]", day, hour);
            }
        }
    }

    #[test]
    fn test_peaks_sorted_and_capped() {
        let raw = [
            "2024-01-01T10:00:00Z",
            "2024-01-02T10:00:00Z",
            "2024-01-03T10:00:00Z",
            "2024-01-01T14:00:00Z",
            "2024-01-02T14:00:00Z",
            "2024-01-01T18:00:00Z",
            "2024-01-01T20:00:00Z",
        ];
        let summary = summarize(&raw).unwrap();

        assert_eq!(
            summary.peak_hours,
            vec![
                PeakHour { hour: 10, count: 3 },
                PeakHour { hour: 14, count: 2 },
                PeakHour { hour: 18, count: 1 },
            ]
        );
        assert_eq!(
            summary.peak_days,
            vec![
                PeakDay { day: 0, count: 4 },
                PeakDay { day: 1, count: 2 },
                PeakDay { day: 2, count: 1 },
            ]
        );
    }

    #[test]
    fn test_peaks_not_padded() {
        let summary = summarize(&["2024-01-01T09:00:00Z", "2024-01-08T09:00:00Z"]).unwrap();
        assert_eq!(summary.peak_hours, vec![PeakHour { hour: 9, count: 2 }]);
        assert_eq!(summary.peak_days, vec![PeakDay { day: 0, count: 2 }]);
    }

    #[test]
    fn test_peak_ties_keep_bucket_order() {
        assert_eq!(rank_peaks(&[0, 2, 5, 2, 2]), vec![(2, 5), (1, 2), (3, 2)]);
        assert!(rank_peaks(&[0, 0, 0]).is_empty());
    }

    #[test]
    fn test_last_post_time_is_max() {
        let summary = summarize(&[
            "2024-01-01T09:00:00Z",
            "2024-03-01T09:00:00Z",
            "2024-02-01T09:00:00Z",
        ])
        .unwrap();
        assert_eq!(
            summary.last_post_time.as_deref(),
            Some("2024-03-01T09:00:00+00:00")
        );
    }

    #[test]
    fn test_scraped_metadata() {
        let summary = summarize(&["2024-01-01T09:00:00Z"]).unwrap();
        assert_eq!(summary.identifier, "tester");
        assert_eq!(summary.display_name, "@tester");
        assert_eq!(summary.profile_image, "");
        assert_eq!(summary.timezone_note, "Times shown in UTC (scraped)");
        assert!(!summary.is_demo);
    }

    #[test]
    fn test_time_slot_bounds() {
        assert!(TimeSlot::new(6, 23).is_some());
        assert!(TimeSlot::new(7, 0).is_none());
        assert!(TimeSlot::new(0, 24).is_none());
        assert!(TimeSlot::new(300, 0).is_none());
    }
}
