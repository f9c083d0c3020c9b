use crate::commands::SessionArgs;
use crate::frets::parse_frets;
use crate::guard::LiveSession;
use anyhow::Result;
use clap::Args;
use colored::*;
use fretlink_client::SendError;
use fretlink_core::{FretState, Role, detect_chord};
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Args, Debug, Clone)]
pub struct ControlArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Fret states to send, e.g. `0,1,0,2,3,0` or `C`. Read from stdin, one
    /// per line, when omitted.
    #[arg(long, num_args = 1..)]
    pub frets: Vec<String>,

    /// Pause between fret states given on the command line.
    #[arg(long, default_value_t = 500)]
    pub interval_ms: u64,
}

pub async fn run(args: ControlArgs) -> Result<()> {
    let max_fret = args.session.client_config().max_fret;
    let states = args
        .frets
        .iter()
        .map(|text| parse_frets(text, max_fret))
        .collect::<Result<Vec<_>>>()?;

    let session = args.session.join(Role::Controller).await?;

    let stopped = if states.is_empty() {
        println!("{}", "🎹 Type a chord or six frets per line, Ctrl-D to stop".cyan());
        stream_stdin(&session, max_fret).await
    } else {
        stream_list(&session, &states, Duration::from_millis(args.interval_ms)).await
    };

    match stopped {
        Stop::Done => println!("{}", "✨ All fret states sent".green().bold()),
        Stop::Interrupted => println!("{}", "👋 Interrupted".yellow()),
        Stop::SessionClosed => println!("{}", "❌ Session closed".red()),
    }

    session.close().await;
    Ok(())
}

enum Stop {
    Done,
    Interrupted,
    SessionClosed,
}

/// Ctrl-C or the session closing for good.
async fn stop_signal(session: &LiveSession) -> Stop {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => Stop::Interrupted,
        _ = session.closed() => Stop::SessionClosed,
    }
}

async fn stream_list(session: &LiveSession, states: &[FretState], interval: Duration) -> Stop {
    let stop = stop_signal(session);
    tokio::pin!(stop);

    for (i, frets) in states.iter().enumerate() {
        if i > 0 {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                stopped = &mut stop => return stopped,
            }
        }
        send(session, *frets);
    }
    Stop::Done
}

async fn stream_stdin(session: &LiveSession, max_fret: u8) -> Stop {
    let mut lines = spawn_stdin_reader();
    let stop = stop_signal(session);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    return Stop::Done;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_frets(&line, max_fret) {
                    Ok(frets) => send(session, frets),
                    Err(e) => println!("{} {:#}", "⚠️ ".yellow(), e),
                }
            }
            stopped = &mut stop => return stopped,
        }
    }
}

/// Blocking stdin reads run on their own thread so Ctrl-C never waits on
/// a pending line.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    rx
}

fn send(session: &LiveSession, frets: FretState) {
    let chord = detect_chord(&frets).unwrap_or("?");
    match session.send_frets(frets) {
        Ok(()) => println!("   {:?} {}", frets.frets(), chord.bold()),
        Err(SendError::NotOpen) => {
            println!("{}", "⚠️  Peer channel not open, fret state dropped".yellow())
        }
        Err(e) => warn!("Failed to send fret state: {}", e),
    }
}
