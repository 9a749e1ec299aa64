/// Synthetic activity for running without a timestamp source.
///
/// Draws a plausible posting pattern from fixed hour-of-day and day-of-week
/// weights. The random source is injected so tests can seed it.
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::aggregate::{build_summary, ActivityCounts, DataOrigin, Profile, TimeSlot};
use crate::summary::ActivitySummary;

/// Inclusive range for the number of synthetic posts.
pub const MIN_DEMO_POSTS: u32 = 150;
pub const MAX_DEMO_POSTS: u32 = 300;

/// Relative weight per UTC hour: quiet overnight, climbing through the
/// morning, busiest in the evening.
const HOUR_WEIGHTS: [u32; 24] = [
    1, 1, 1, 1, 1, 2, 3, 5, 8, 10, 12, 14, 15, 14, 13, 14, 16, 18, 20, 22, 18, 12, 6, 3,
];

/// Relative weight per weekday, Monday first.
const DAY_WEIGHTS: [u32; 7] = [18, 20, 22, 20, 18, 12, 10];

/// Generate a demo summary for `identifier` using `rng`.
pub fn generate_demo<R: Rng>(identifier: &str, rng: &mut R) -> ActivitySummary {
    let posts = rng.gen_range(MIN_DEMO_POSTS..=MAX_DEMO_POSTS);

    let counts = sample_counts(posts, rng);
    debug!(
        "Generated {} demo posts for {}",
        counts.total(),
        identifier
    );

    build_summary(
        &counts,
        &Profile::placeholder(identifier),
        DataOrigin::Demo,
        None,
    )
}

/// Generate a demo summary from the thread-local generator.
pub fn generate_demo_unseeded(identifier: &str) -> ActivitySummary {
    generate_demo(identifier, &mut rand::thread_rng())
}

fn sample_counts<R: Rng>(posts: u32, rng: &mut R) -> ActivityCounts {
    let mut counts = ActivityCounts::new();

    // Weights are non-empty constants with positive sums
    let (Ok(hours), Ok(days)) = (
        WeightedIndex::new(HOUR_WEIGHTS),
        WeightedIndex::new(DAY_WEIGHTS),
    ) else {
        return counts;
    };

    for _ in 0..posts {
        let hour = hours.sample(rng);
        let day = days.sample(rng);
        if let Some(slot) = TimeSlot::new(day, hour) {
            counts.record(slot);
        }
    }

    counts
}
