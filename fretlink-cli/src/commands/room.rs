use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use fretlink_client::{ClientConfig, RoomDirectory};

#[derive(Subcommand, Debug, Clone)]
pub enum RoomCommands {
    /// Reserve a room and print its access token.
    Create {
        #[arg(long, env = "FRETLINK_SERVER", default_value = "localhost:8000")]
        server: String,

        /// Preferred room code; a random one is generated when omitted.
        #[arg(long)]
        room: Option<String>,
    },
}

pub async fn run(command: RoomCommands) -> Result<()> {
    match command {
        RoomCommands::Create { server, room } => {
            let config = ClientConfig::for_server(&server);
            let directory = RoomDirectory::new(&config.api_url)?;
            let ticket = directory
                .create_room(room.as_deref())
                .await
                .with_context(|| format!("Room request to {} failed", directory.base_url()))?;

            println!("{}", "✨ Room ready".green().bold());
            println!("   Room:    {}", ticket.room_id.bold());
            println!("   Token:   {}", ticket.access_token);
            println!("   Expires: in {}s", ticket.expires_in);
            println!(
                "{}",
                format!(
                    "   fretlink control --room {} --token {}",
                    ticket.room_id, ticket.access_token
                )
                .dimmed()
            );
        }
    }

    Ok(())
}
