//! Course page helpers
//!
//! Pure string logic the page layer needs around the tracker: pulling video
//! ids out of embed URLs, working out the next lesson, and formatting the
//! labels shown next to the progress counters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stats::{DailyRecord, PageCompletion};

static EMBED_VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/video/(\d+)").expect("valid embed regex"));

static LESSON_PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pages/(\d+)").expect("valid page regex"));

/// Numeric video id from a player embed URL
///
/// `https://player.vimeo.com/video/123456?h=abc` gives `"123456"`. URLs
/// without an id give `None` and the embed is not tracked.
pub fn video_id_from_embed_url(src: &str) -> Option<String> {
    EMBED_VIDEO_ID
        .captures(src)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Title used when no heading is found near an embed
pub fn fallback_title(index: usize) -> String {
    format!("Video {}", index + 1)
}

/// URL of the following lesson page, `None` if the URL has no page number
pub fn next_lesson_url(current: &str) -> Option<String> {
    let captures = LESSON_PAGE.captures(current)?;
    let page: u64 = captures.get(1)?.as_str().parse().ok()?;
    let next = page.checked_add(1)?;
    Some(
        LESSON_PAGE
            .replace(current, format!("pages/{}", next).as_str())
            .into_owned(),
    )
}

/// "m:ss" with zero-padded seconds; negative or unknown durations read as 0:00
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Sidebar header, e.g. "4 videos found • 1/4 watched"
pub fn progress_label(completion: &PageCompletion) -> String {
    format!(
        "{} videos found • {}/{} watched",
        completion.videos_total, completion.videos_watched, completion.videos_total
    )
}

/// Daily line under the header, `None` until something was watched today
pub fn today_label(today: &DailyRecord) -> Option<String> {
    if today.videos_watched == 0 {
        return None;
    }
    Some(format!(
        "Today: {} videos • {} watched",
        today.videos_watched,
        format_duration(today.total_time_watched as f64)
    ))
}
