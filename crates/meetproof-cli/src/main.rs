//! MeetProof CLI: the `meetproof` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let ledger = cli.ledger;

    match cli.command {
        Commands::Init {
            owner,
            genesis_block,
            json,
        } => commands::init::run(ledger, owner, genesis_block, json),

        Commands::CreateSession {
            caller,
            secret,
            secret_hex,
            lat,
            lon,
            radius,
            duration,
            min_participants,
            max_participants,
            json,
        } => commands::create_session::run(commands::create_session::Args {
            ledger,
            caller,
            secret,
            secret_hex,
            lat,
            lon,
            radius,
            duration,
            min_participants,
            max_participants,
            json,
        }),

        Commands::VerifyParticipation {
            session_id,
            caller,
            secret,
            secret_hex,
            lat,
            lon,
            json,
        } => commands::verify_participation::run(commands::verify_participation::Args {
            ledger,
            session_id,
            caller,
            secret,
            secret_hex,
            lat,
            lon,
            json,
        }),

        Commands::SetPaused {
            paused,
            caller,
            json,
        } => commands::set_paused::run(ledger, caller, paused, json),

        Commands::Mine { blocks, json } => commands::mine::run(ledger, blocks, json),

        Commands::Session {
            session_id,
            participant,
            json,
        } => commands::session::run(ledger, session_id, participant, json),

        Commands::Status { json } => commands::status::run(ledger, json),

        Commands::Errors { json } => commands::errors::run(json),

        Commands::Replay { json } => commands::replay::run(ledger, json),
    }
}
