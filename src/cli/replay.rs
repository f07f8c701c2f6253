//! Replay command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::mpsc;

use coursetrack::page::{format_duration, progress_label, video_id_from_embed_url};
use coursetrack::player::{PlaybackEvent, TrackerUpdate, run_event_loop};

use super::open_session;

/// Parse JSON-lines events, skipping blank lines, `#` comments and bad lines
pub fn parse_events(content: &str) -> Vec<PlaybackEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|(i, line)| match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", i + 1, e);
                None
            }
        })
        .collect()
}

/// Distinct video ids mentioned by the recording, in first-seen order
pub fn page_video_ids(events: &[PlaybackEvent]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for event in events {
        let id = match event {
            PlaybackEvent::EmbedFound { src } => video_id_from_embed_url(src),
            PlaybackEvent::VideoIdentified { video_id, .. }
            | PlaybackEvent::DurationResolved { video_id, .. }
            | PlaybackEvent::TimeUpdate { video_id, .. } => Some(video_id.trim().to_string()),
            PlaybackEvent::CaseToggled { .. } => None,
        };
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Feed a recorded event stream through a fresh tracking session
pub async fn replay_command(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read events file: {}", file.display()))?;
    let events = parse_events(&content);

    let (_, mut tracker) = open_session(config_path)?;

    let page_videos = page_video_ids(&events);

    let (event_tx, event_rx) = mpsc::channel(64);
    let (update_tx, mut update_rx) = mpsc::channel(64);

    let producer = tokio::spawn(async move {
        for event in events {
            if event_tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            match update {
                TrackerUpdate::VideoTracked { video_id } => println!("  tracking video {}", video_id),
                TrackerUpdate::VideoCounted { video_id, first_time: true } => {
                    println!("  ✅ video {} watched for the first time", video_id)
                }
                TrackerUpdate::VideoCounted { video_id, first_time: false } => {
                    println!("  video {} watched again", video_id)
                }
                TrackerUpdate::CaseChanged { case_id, viewed } => {
                    println!("  case {} {}", case_id, if viewed { "viewed" } else { "unmarked" })
                }
            }
        }
    });

    let applied = run_event_loop(&mut tracker, event_rx, update_tx).await;
    producer.await.context("Event producer panicked")?;
    printer.await.context("Update printer panicked")?;

    let view = tracker.view();
    let today = view.today_summary();
    println!("\nApplied {} events.", applied);
    if !page_videos.is_empty() {
        println!("{}", progress_label(&view.page_completion::<String, String>(&page_videos, &[])));
    }
    println!(
        "Today: {} videos • {} watched",
        today.videos_watched,
        format_duration(today.total_time_watched as f64)
    );
    Ok(())
}
