use crate::support::{open_ledger_or_exit, secret_or_exit, transact_and_report};
use meetproof_kernel::{Call, Location, SessionParams};

pub struct Args {
    pub ledger: String,
    pub caller: String,
    pub secret: Option<String>,
    pub secret_hex: Option<String>,
    pub lat: i64,
    pub lon: i64,
    pub radius: u64,
    pub duration: u64,
    pub min_participants: u64,
    pub max_participants: u64,
    pub json: bool,
}

pub fn run(args: Args) {
    let secret = secret_or_exit(args.secret, args.secret_hex);
    let ledger = open_ledger_or_exit(&args.ledger);
    let call = Call::CreateSession(SessionParams {
        secret,
        location: Location::new(args.lat, args.lon),
        radius: args.radius,
        duration_blocks: args.duration,
        min_participants: args.min_participants,
        max_participants: args.max_participants,
    });
    transact_and_report(&ledger, args.caller, call, args.json);
}
