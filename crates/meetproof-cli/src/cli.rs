use crate::support::DEFAULT_LEDGER_PATH;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "meetproof",
    about = "MeetProof: proof-of-presence sessions bound to a secret, a place, and a block deadline",
    version
)]
pub struct Cli {
    /// Path to the ledger state file (journal and lock live next to it)
    #[arg(long, global = true, default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a fresh ledger with the given owner
    Init {
        /// Contract owner principal (the only caller allowed to pause)
        #[arg(long)]
        owner: String,

        /// Block height the ledger starts at
        #[arg(long, default_value_t = 0)]
        genesis_block: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a new session at the current block
    CreateSession {
        /// Calling principal
        #[arg(long, env = "MEETPROOF_CALLER")]
        caller: String,

        /// Shared secret as UTF-8 text
        #[arg(long, conflicts_with = "secret_hex", required_unless_present = "secret_hex")]
        secret: Option<String>,

        /// Shared secret as hex bytes
        #[arg(long)]
        secret_hex: Option<String>,

        /// Latitude in microdegrees
        #[arg(long, allow_negative_numbers = true)]
        lat: i64,

        /// Longitude in microdegrees
        #[arg(long, allow_negative_numbers = true)]
        lon: i64,

        /// Acceptance radius in meters
        #[arg(long)]
        radius: u64,

        /// Number of blocks the session stays open after creation
        #[arg(long)]
        duration: u64,

        /// Participants needed for confirmation
        #[arg(long = "min", default_value_t = 1)]
        min_participants: u64,

        /// Participant capacity
        #[arg(long = "max")]
        max_participants: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Claim participation in a session at the current block
    VerifyParticipation {
        /// Session identifier
        session_id: u64,

        /// Calling principal
        #[arg(long, env = "MEETPROOF_CALLER")]
        caller: String,

        /// Claimed secret as UTF-8 text
        #[arg(long, conflicts_with = "secret_hex", required_unless_present = "secret_hex")]
        secret: Option<String>,

        /// Claimed secret as hex bytes
        #[arg(long)]
        secret_hex: Option<String>,

        /// Claimed latitude in microdegrees
        #[arg(long, allow_negative_numbers = true)]
        lat: i64,

        /// Claimed longitude in microdegrees
        #[arg(long, allow_negative_numbers = true)]
        lon: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pause or resume all mutating calls (owner only)
    SetPaused {
        /// `true` to pause, `false` to resume
        #[arg(long, action = ArgAction::Set)]
        paused: bool,

        /// Calling principal
        #[arg(long, env = "MEETPROOF_CALLER")]
        caller: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Advance the ledger's block height
    Mine {
        /// Number of blocks to advance
        #[arg(default_value_t = 1)]
        blocks: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one session and its status at the current block
    Session {
        /// Session identifier
        session_id: u64,

        /// Also report whether this principal has participated
        #[arg(long)]
        participant: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ledger and contract summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the canonical error kind -> code table
    Errors {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-execute the journal and compare against the ledger state
    Replay {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
