use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(test)]
use anyhow::anyhow;
#[cfg(test)]
use jsonschema::{Draft, JSONSchema};

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_WEEK: usize = 7;
pub const MAX_PEAKS: usize = 3;

/// Posting-time summary for one profile, as returned to callers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ActivitySummary {
    pub identifier: String,
    pub display_name: String,
    pub profile_image: String,
    pub total_count: u32,
    /// Hour of day ("0".."23", UTC) -> count. Always holds all 24 keys.
    pub hourly: IndexMap<String, u32>,
    /// Day of week ("0" = Monday .. "6" = Sunday) -> count. Always holds all 7 keys.
    pub daily: IndexMap<String, u32>,
    /// Rows are days (Monday first), columns are hours.
    pub heatmap: Vec<Vec<u32>>,
    pub peak_hours: Vec<PeakHour>,
    pub peak_days: Vec<PeakDay>,
    pub timezone_note: String,
    pub is_demo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_post_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeakHour {
    pub hour: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeakDay {
    pub day: u32,
    pub count: u32,
}

impl ActivitySummary {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read summary file: {}", path.display()))?;

        let summary: ActivitySummary = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

        summary
            .validate()
            .with_context(|| format!("Inconsistent summary in: {}", path.display()))?;

        Ok(summary)
    }

    /// Count for an hour bucket, 0 when the key is missing.
    pub fn hour_count(&self, hour: usize) -> u32 {
        self.hourly.get(&hour.to_string()).copied().unwrap_or(0)
    }

    /// Count for a day bucket, 0 when the key is missing.
    pub fn day_count(&self, day: usize) -> u32 {
        self.daily.get(&day.to_string()).copied().unwrap_or(0)
    }

    /// Check the structural invariants of a summary.
    ///
    /// Hourly, daily, heatmap and total must all describe the same set of
    /// posts, and peak lists must be short, positive and sorted.
    pub fn validate(&self) -> Result<()> {
        check_keys(&self.hourly, HOURS_PER_DAY, "hourly")?;
        check_keys(&self.daily, DAYS_PER_WEEK, "daily")?;

        if self.heatmap.len() != DAYS_PER_WEEK {
            bail!(
                "heatmap has {} rows, expected {}",
                self.heatmap.len(),
                DAYS_PER_WEEK
            );
        }
        for (day, row) in self.heatmap.iter().enumerate() {
            if row.len() != HOURS_PER_DAY {
                bail!(
                    "heatmap row {} has {} columns, expected {}",
                    day,
                    row.len(),
                    HOURS_PER_DAY
                );
            }
            let row_sum: u64 = row.iter().map(|&c| u64::from(c)).sum();
            if row_sum != u64::from(self.day_count(day)) {
                bail!(
                    "heatmap row {} sums to {}, daily[{}] is {}",
                    day,
                    row_sum,
                    day,
                    self.day_count(day)
                );
            }
        }
        for hour in 0..HOURS_PER_DAY {
            let column_sum: u64 = self.heatmap.iter().map(|row| u64::from(row[hour])).sum();
            if column_sum != u64::from(self.hour_count(hour)) {
                bail!(
                    "heatmap column {} sums to {}, hourly[{}] is {}",
                    hour,
                    column_sum,
                    hour,
                    self.hour_count(hour)
                );
            }
        }

        // Wide sums so oversized counts fail validation instead of overflowing
        let hourly_total: u64 = self.hourly.values().map(|&c| u64::from(c)).sum();
        let daily_total: u64 = self.daily.values().map(|&c| u64::from(c)).sum();
        let total = u64::from(self.total_count);
        if hourly_total != total || daily_total != total {
            bail!(
                "totals disagree: total_count={}, hourly={}, daily={}",
                self.total_count,
                hourly_total,
                daily_total
            );
        }

        let hour_peaks: Vec<(usize, u32)> = self
            .peak_hours
            .iter()
            .map(|p| (p.hour as usize, p.count))
            .collect();
        check_peaks(&hour_peaks, HOURS_PER_DAY, |h| self.hour_count(h), "peak_hours")?;

        let day_peaks: Vec<(usize, u32)> = self
            .peak_days
            .iter()
            .map(|p| (p.day as usize, p.count))
            .collect();
        check_peaks(&day_peaks, DAYS_PER_WEEK, |d| self.day_count(d), "peak_days")?;

        Ok(())
    }

    #[cfg(test)]
    /// Validate summary JSON against the JSON schema
    pub fn validate_with_schema(
        summary_json: &serde_json::Value,
        schema: &JSONSchema,
    ) -> Result<()> {
        match schema.validate(summary_json) {
            Ok(_) => Ok(()),
            Err(errors) => {
                let error_messages: Vec<String> = errors
                    .map(|e| format!("  - {}: {}", e.instance_path, e))
                    .collect();
                bail!("Summary validation failed:\n{}", error_messages.join("\n"))
            }
        }
    }

    #[cfg(test)]
    /// Load and compile the JSON schema
    pub fn load_schema(schema_path: &Path) -> Result<JSONSchema> {
        let schema_content = std::fs::read_to_string(schema_path)
            .with_context(|| format!("Failed to read schema file: {}", schema_path.display()))?;

        let schema_json: serde_json::Value =
            serde_json::from_str(&schema_content).with_context(|| {
                format!(
                    "Failed to parse schema JSON from: {}",
                    schema_path.display()
                )
            })?;

        JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map_err(|e| anyhow!("Failed to compile JSON schema: {}", e))
    }
}

fn check_keys(map: &IndexMap<String, u32>, expected: usize, name: &str) -> Result<()> {
    if map.len() != expected {
        bail!("{} has {} keys, expected {}", name, map.len(), expected);
    }
    for bucket in 0..expected {
        if !map.contains_key(&bucket.to_string()) {
            bail!("{} is missing key \"{}\"", name, bucket);
        }
    }
    Ok(())
}

fn check_peaks<F>(peaks: &[(usize, u32)], buckets: usize, count_of: F, name: &str) -> Result<()>
where
    F: Fn(usize) -> u32,
{
    if peaks.len() > MAX_PEAKS {
        bail!("{} has {} entries, at most {} allowed", name, peaks.len(), MAX_PEAKS);
    }
    for (i, &(bucket, count)) in peaks.iter().enumerate() {
        if bucket >= buckets {
            bail!("{} entry {} is out of range", name, bucket);
        }
        if count == 0 {
            bail!("{} entry {} has a zero count", name, bucket);
        }
        if count != count_of(bucket) {
            bail!(
                "{} entry {} says {}, bucket holds {}",
                name,
                bucket,
                count,
                count_of(bucket)
            );
        }
        if i > 0 && peaks[i - 1].1 < count {
            bail!("{} is not sorted by count", name);
        }
    }
    Ok(())
}
