use crate::guard::{LiveSession, is_notable};
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use fretlink_client::{ClientConfig, RoomDirectory, SessionEvent, SignalingClient};
use fretlink_core::{Role, RoomId};
use std::time::Duration;
use tokio::sync::broadcast;

pub mod control;
pub mod perform;
pub mod room;
pub mod serve;

pub use control::ControlArgs;
pub use perform::PerformArgs;
pub use room::RoomCommands;
pub use serve::ServeArgs;

/// Where and how to join a room.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Server address as `host:port`.
    #[arg(long, env = "FRETLINK_SERVER", default_value = "localhost:8000")]
    pub server: String,

    /// Room to join. Prompted for when omitted.
    #[arg(long)]
    pub room: Option<String>,

    /// Access token. Requested from the server when omitted.
    #[arg(long)]
    pub token: Option<String>,

    /// Skip STUN and use host candidates only.
    #[arg(long)]
    pub no_stun: bool,

    /// Seconds to wait for the peer channel to open.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

impl SessionArgs {
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::for_server(&self.server);
        if self.no_stun {
            config.local_only()
        } else {
            config
        }
    }

    /// Joins as `role` and waits until the peer channel is open.
    pub async fn join(&self, role: Role) -> Result<LiveSession> {
        let config = self.client_config();
        let room_id = match &self.room {
            Some(room) => RoomId::parse(room)?.as_str().to_string(),
            None => prompt_room()?,
        };

        let token = match &self.token {
            Some(token) => token.clone(),
            None => {
                let directory = RoomDirectory::new(&config.api_url)?;
                directory
                    .create_room(Some(room_id.as_str()))
                    .await
                    .with_context(|| format!("Failed to get a token for room {}", room_id))?
                    .access_token
            }
        };

        println!(
            "{} room {} as {}",
            "🔗 Joining".cyan(),
            room_id.bold(),
            role.to_string().bold()
        );

        let client = SignalingClient::new(config);
        let handle = client.session(&room_id, role, &token);
        let printer = tokio::spawn(print_events(handle.subscribe()));
        let session = LiveSession::new(handle, printer);

        session.connect().await?;
        session
            .connected(Duration::from_secs(self.timeout))
            .await
            .context("Peer channel did not open")?;

        Ok(session)
    }
}

fn prompt_room() -> Result<String> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Room code")
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            RoomId::parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(RoomId::parse(&raw)?.as_str().to_string())
}

async fn print_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(event) if is_notable(&event) => print_event(&event),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Joined { room_id, role } => {
            println!("   Joined {} as {}", room_id.bold(), role);
            println!("{}", "⏳ Waiting for the other side...".dimmed());
        }
        SessionEvent::PeerReady => println!("   Peer is here, negotiating..."),
        SessionEvent::PeerLeft { role } => match role {
            Some(role) => println!("{} {} left the room", "⚠️ ".yellow(), role),
            None => println!("{}", "⚠️  Peer connection lost".yellow()),
        },
        SessionEvent::Connected => println!("{}", "✅ Peer channel open".green().bold()),
        SessionEvent::Error { message, fatal } => {
            if *fatal {
                println!("{} {}", "❌".red(), message.red().bold());
            } else {
                println!("{} {}", "⚠️ ".yellow(), message.yellow());
            }
        }
        SessionEvent::StateChanged(_) | SessionEvent::Message(_) => {}
    }
}
