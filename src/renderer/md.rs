use crate::summary::*;
use anyhow::Result;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Render a summary to Markdown
pub fn render(summary: &ActivitySummary) -> Result<String> {
    let mut output = String::new();

    // 1. Title and profile details
    render_header(&mut output, summary);

    // 2. Summary
    render_summary(&mut output, summary);

    // 3. Peaks
    render_peaks(&mut output, summary);

    // 4. Activity tables
    render_weekdays(&mut output, summary);
    render_hours(&mut output, summary);

    // 5. Heatmap
    render_heatmap(&mut output, summary);

    Ok(output)
}

/// Default report file name for a summary.
pub fn default_filename(summary: &ActivitySummary) -> String {
    if summary.is_demo {
        format!("peakhours-{}-demo.md", summary.identifier)
    } else {
        format!("peakhours-{}.md", summary.identifier)
    }
}

fn render_header(output: &mut String, summary: &ActivitySummary) {
    let handle = format!("@{}", summary.identifier);

    if summary.display_name != handle {
        output.push_str(&format!(
            "# 🕐 When {} posts — {}\n",
            handle, summary.display_name
        ));
    } else {
        output.push_str(&format!("# 🕐 When {} posts\n", handle));
    }

    output.push_str("### 🧑 Profile\n");
    output.push_str(&format!("- **Handle:** {}\n", handle));
    if summary.display_name != handle {
        output.push_str(&format!("- **Display name:** {}\n", summary.display_name));
    }
    if !summary.profile_image.is_empty() {
        output.push_str(&format!(
            "- **Avatar:** [{}]({})\n",
            summary.profile_image, summary.profile_image
        ));
    }
    output.push('\n');
}

fn render_summary(output: &mut String, summary: &ActivitySummary) {
    output.push_str("### 📊 Summary\n");
    output.push_str(&format!(
        "- 💬 **Posts analyzed:** {}\n",
        format_number(summary.total_count)
    ));
    if let Some(ref last) = summary.last_post_time {
        output.push_str(&format!("- 🆕 **Most recent post:** {}\n", last));
    }
    if summary.is_demo {
        output.push_str("- 🧪 **Demo data:** synthetic activity, not a real profile\n");
    }

    output.push_str(&format!("\n*{}.*\n\n", summary.timezone_note));
}

fn render_peaks(output: &mut String, summary: &ActivitySummary) {
    if summary.peak_hours.is_empty() && summary.peak_days.is_empty() {
        return;
    }

    output.push_str("#### 🚀 Peaks\n");

    if !summary.peak_hours.is_empty() {
        let hours: Vec<String> = summary
            .peak_hours
            .iter()
            .map(|p| format!("{} ({})", hour_label(p.hour), post_count(p.count)))
            .collect();
        output.push_str(&format!("- 🕐 **Busiest hours:** {}\n", hours.join(", ")));
    }

    if !summary.peak_days.is_empty() {
        let days: Vec<String> = summary
            .peak_days
            .iter()
            .map(|p| {
                let name = WEEKDAY_NAMES.get(p.day as usize).copied().unwrap_or("?");
                format!("{} ({})", name, post_count(p.count))
            })
            .collect();
        output.push_str(&format!("- 📅 **Busiest days:** {}\n", days.join(", ")));
    }

    output.push('\n');
}

fn render_weekdays(output: &mut String, summary: &ActivitySummary) {
    output.push_str("#### 📅 By weekday\n");
    output.push_str("| Mon | Tue | Wed | Thu | Fri | Sat | Sun |\n");
    output.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");

    output.push('|');
    for day in 0..DAYS_PER_WEEK {
        output.push_str(&format!(" {} |", format_number(summary.day_count(day))));
    }
    output.push_str("\n\n");
}

fn render_hours(output: &mut String, summary: &ActivitySummary) {
    output.push_str("#### 🕐 By hour (UTC)\n");

    // Hours 00-11
    output.push_str("| 00 | 01 | 02 | 03 | 04 | 05 | 06 | 07 | 08 | 09 | 10 | 11 |\n");
    output.push_str("| -- | -- | -- | -- | -- | -- | -- | -- | -- | -- | -- | -- |\n");
    output.push('|');
    for hour in 0..12 {
        output.push_str(&format!(" {} |", format_number(summary.hour_count(hour))));
    }
    output.push('\n');

    // Hours 12-23
    output.push_str("\n| 12 | 13 | 14 | 15 | 16 | 17 | 18 | 19 | 20 | 21 | 22 | 23 |\n");
    output.push_str("| -- | -- | -- | -- | -- | -- | -- | -- | -- | -- | -- | -- |\n");
    output.push('|');
    for hour in 12..HOURS_PER_DAY {
        output.push_str(&format!(" {} |", format_number(summary.hour_count(hour))));
    }
    output.push_str("\n\n");
}

fn render_heatmap(output: &mut String, summary: &ActivitySummary) {
    output.push_str("#### 🔥 Heatmap (day × hour, UTC)\n");

    output.push_str("| Day |");
    for hour in 0..HOURS_PER_DAY {
        output.push_str(&format!(" {:02} |", hour));
    }
    output.push('\n');
    output.push_str("| --- |");
    for _ in 0..HOURS_PER_DAY {
        output.push_str(" -- |");
    }
    output.push('\n');

    for (day, row) in summary.heatmap.iter().enumerate() {
        let label = WEEKDAYS.get(day).copied().unwrap_or("?");
        output.push_str(&format!("| {} |", label));
        for &count in row {
            // Empty cells stay blank-ish so busy ones stand out
            if count == 0 {
                output.push_str(" · |");
            } else {
                output.push_str(&format!(" {} |", count));
            }
        }
        output.push('\n');
    }
    output.push('\n');
}

fn post_count(count: u32) -> String {
    if count == 1 {
        "1 post".to_string()
    } else {
        format!("{} posts", format_number(count))
    }
}

fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Format a number with thousand separators (raw integers, no abbreviation)
fn format_number(n: u32) -> String {
    let digits = n.to_string();
    let mut grouped_rev = String::new();

    // Insert commas every three digits, starting from the right
    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped_rev.push(',');
        }
        grouped_rev.push(ch);
    }

    grouped_rev.chars().rev().collect()
}
