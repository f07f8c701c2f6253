//! Stats display commands

use anyhow::Result;
use std::path::Path;

use coursetrack::page::{format_duration, today_label};

use super::open_session;

const BAR_WIDTH: u64 = 24;

/// Print today's study line
pub fn today_command(config_path: Option<&Path>) -> Result<()> {
    let (_, tracker) = open_session(config_path)?;
    let today = tracker.view().today_summary();

    match today_label(&today) {
        Some(line) => println!("{}", line),
        None => println!("No videos watched today."),
    }
    if today.unique_videos_watched > 0 {
        println!("  {} watched for the first time", today.unique_videos_watched);
    }
    if today.cases_viewed > 0 {
        println!("  {} cases viewed", today.cases_viewed);
    }
    Ok(())
}

/// Print the 7-day stats window
pub fn week_command(config_path: Option<&Path>, json: bool) -> Result<()> {
    let (_, tracker) = open_session(config_path)?;
    let rollup = tracker.view().seven_day_rollup();

    if json {
        println!("{}", serde_json::to_string_pretty(&rollup)?);
        return Ok(());
    }

    println!("Your 7-Day Study Stats\n");
    println!(
        "  Total Videos: {}   Total Time: {}   Avg/Day: {:.1}",
        rollup.total_videos,
        format_duration(rollup.total_time_watched as f64),
        rollup.avg_videos_per_day()
    );
    println!(
        "  New Videos: {}   Cases Viewed: {}\n",
        rollup.total_unique_videos, rollup.total_cases_viewed
    );

    let scale = rollup.chart_scale();
    for day in &rollup.days {
        let filled = (day.record.videos_watched * BAR_WIDTH / scale) as usize;
        println!(
            "  {} {}  {:<width$} {:>3}  {}",
            day.day_name,
            day.date,
            "█".repeat(filled),
            day.record.videos_watched,
            format_duration(day.record.total_time_watched as f64),
            width = BAR_WIDTH as usize
        );
    }
    Ok(())
}

/// Print runtime stats for one video, or the videos with the most playback
pub fn video_command(config_path: Option<&Path>, id: Option<&str>, limit: usize) -> Result<()> {
    let (_, tracker) = open_session(config_path)?;
    let view = tracker.view();

    let Some(id) = id else {
        let top = view.top_videos_by_time(limit);
        if top.is_empty() {
            println!("No playback recorded yet.");
            return Ok(());
        }
        println!("Videos by time spent ({}):\n", top.len());
        for (video_id, seconds) in top {
            let mark = if view.is_video_watched(&video_id) { "✅" } else { "  " };
            println!("  {} {:<14} {}", mark, video_id, format_duration(seconds));
        }
        println!("\n  Total: {}", format_duration(view.total_time_spent()));
        return Ok(());
    };

    let Some(stats) = tracker.video_stats(id) else {
        println!("No stats for video {}.", id);
        return Ok(());
    };
    println!("Video {}", id);
    println!("  Watched:       {}", if view.is_video_watched(id) { "yes" } else { "no" });
    println!("  Completions:   {}", stats.watch_count);
    println!("  Time spent:    {}", format_duration(stats.time_spent));
    println!("  Last position: {}", format_duration(stats.last_position));
    Ok(())
}
