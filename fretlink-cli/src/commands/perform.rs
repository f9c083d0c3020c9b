use crate::commands::SessionArgs;
use crate::guard::LiveSession;
use crate::replay::HandReplay;
use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use fretlink_core::{FretState, Role, Song, builtin_songs};
use fretlink_stage::{
    JsonFileProgressStore, Judgment, Performance, PerformanceSummary, ProgressBook, Rating,
    StageConfig,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct PerformArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Built-in song id or a song JSON file. Picked from a list when omitted.
    #[arg(long)]
    pub song: Option<String>,

    /// Recorded hand samples, one JSON frame per line.
    #[arg(long)]
    pub hands: Option<PathBuf>,

    /// Frame loop period.
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,

    /// Canvas size the hand samples were recorded in.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    #[arg(long, default_value_t = 720.0)]
    pub height: f32,

    #[arg(long, env = "FRETLINK_PROGRESS", default_value = "fretlink-progress.json")]
    pub progress: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Finished,
    Interrupted,
    SessionClosed,
}

pub async fn run(args: PerformArgs) -> Result<()> {
    let song = resolve_song(args.song.as_deref())?;
    let hands_path = match &args.hands {
        Some(path) => path.clone(),
        None => prompt_hands()?,
    };
    let mut replay = HandReplay::load(&hands_path)?;
    if replay.is_empty() {
        bail!("{} holds no hand samples", hands_path.display());
    }
    println!(
        "{} {} by {} ({} chords, {} frames over {}ms)",
        "🎵".cyan(),
        song.title.bold(),
        song.artist,
        song.total_chords(),
        replay.len(),
        replay.duration_ms()
    );

    let session = args.session.join(Role::Performer).await?;

    let mut performance = Performance::new(
        song.chord_chart.clone(),
        StageConfig::for_canvas(args.width, args.height),
    );
    let outcome = play(
        &mut performance,
        &mut replay,
        Duration::from_millis(args.tick_ms.max(1)),
        || session.latest_frets(),
        stop_signal(&session),
    )
    .await;
    session.close().await;

    let summary = performance.summary();
    print_summary(&summary, outcome);

    if outcome == Outcome::Finished {
        record_progress(&args.progress, &song, &summary)?;
    }
    Ok(())
}

/// Fixed-rate frame loop. Ends when the song completes or `stop` resolves.
async fn play(
    performance: &mut Performance,
    replay: &mut HandReplay,
    period: Duration,
    frets: impl Fn() -> Option<FretState>,
    stop: impl Future<Output = Outcome>,
) -> Outcome {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();
    info!("Frame loop started at {:?} per tick", period);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let report = performance.tick(now_ms, replay.frame_at(now_ms), frets());

                for judgment in &report.judgments {
                    print_judgment(judgment);
                }
                if report.completed {
                    return Outcome::Finished;
                }
            }
            outcome = &mut stop => return outcome,
        }
    }
}

/// Ctrl-C or the session closing for good.
async fn stop_signal(session: &LiveSession) -> Outcome {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => Outcome::Interrupted,
        _ = session.closed() => Outcome::SessionClosed,
    }
}

fn resolve_song(arg: Option<&str>) -> Result<Song> {
    let catalog = builtin_songs();

    let Some(arg) = arg else {
        let labels = catalog
            .iter()
            .map(|s| format!("{} ({:?}, {} bpm)", s.title, s.difficulty, s.bpm))
            .collect::<Vec<_>>();
        let picked = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Song")
            .items(&labels)
            .default(0)
            .interact()?;
        return catalog
            .into_iter()
            .nth(picked)
            .context("no song selected");
    };

    let path = Path::new(arg);
    if arg.ends_with(".json") || path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read song {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("Invalid song file {}", path.display()));
    }

    match catalog.iter().find(|s| s.id == arg) {
        Some(song) => Ok(song.clone()),
        None => {
            let ids = catalog.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
            bail!("Unknown song {:?}, built-in songs: {}", arg, ids.join(", "))
        }
    }
}

fn prompt_hands() -> Result<PathBuf> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Hand samples (.jsonl)")
        .interact_text()?;
    Ok(PathBuf::from(raw.trim()))
}

fn print_judgment(judgment: &Judgment) {
    let rating = match judgment.rating {
        Rating::Perfect => "PERFECT".green().bold(),
        Rating::Great => "GREAT".cyan().bold(),
        Rating::Miss => "MISS".red().bold(),
    };
    let fingering = match (judgment.frets, judgment.fingering_matched) {
        (None, _) => "".normal(),
        (Some(_), true) => "✓ fingering".green(),
        (Some(_), false) => "✗ fingering".dimmed(),
    };

    if judgment.rating.is_hit() {
        println!(
            "   {:>6}ms {:<4} {} {:+}ms {}",
            judgment.at_ms, judgment.note.target.chord, rating, judgment.offset_ms, fingering
        );
    } else {
        println!(
            "   {:>6}ms {:<4} {}",
            judgment.at_ms, judgment.note.target.chord, rating
        );
    }
}

fn print_summary(summary: &PerformanceSummary, outcome: Outcome) {
    let headline = match outcome {
        Outcome::Finished if summary.cleared() => "🏆 Song cleared".green().bold(),
        Outcome::Finished => "🎸 Song finished".yellow().bold(),
        Outcome::Interrupted => "👋 Stopped early".yellow().bold(),
        Outcome::SessionClosed => "❌ Session closed".red().bold(),
    };

    println!("{}", headline);
    println!("   Score:     {}", summary.score.to_string().bold());
    println!("   Max combo: {}", summary.max_combo);
    println!(
        "   Hits:      {}/{} ({} perfect, {} missed)",
        summary.hits, summary.notes, summary.perfects, summary.misses
    );
    println!("   Accuracy:  {:.1}%", summary.accuracy() * 100.0);
}

fn record_progress(path: &Path, song: &Song, summary: &PerformanceSummary) -> Result<()> {
    let played_at_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default();

    let mut book = ProgressBook::open(JsonFileProgressStore::new(path))?;
    let progress = book
        .record(&song.id, summary.score, summary.cleared(), played_at_ms)
        .clone();
    book.flush()?;

    let overall = book.overall(builtin_songs().len());
    println!(
        "   Best:      {} ({} clears)",
        progress.best_score, progress.clear_count
    );
    println!(
        "{}",
        format!(
            "   Progress:  {}/{} songs cleared, saved to {}",
            overall.cleared,
            overall.total,
            path.display()
        )
        .dimmed()
    );
    Ok(())
}
