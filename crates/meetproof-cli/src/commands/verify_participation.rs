use crate::support::{open_ledger_or_exit, secret_or_exit, transact_and_report};
use meetproof_kernel::{Call, Location, SessionId};

pub struct Args {
    pub ledger: String,
    pub session_id: u64,
    pub caller: String,
    pub secret: Option<String>,
    pub secret_hex: Option<String>,
    pub lat: i64,
    pub lon: i64,
    pub json: bool,
}

pub fn run(args: Args) {
    let secret = secret_or_exit(args.secret, args.secret_hex);
    let ledger = open_ledger_or_exit(&args.ledger);
    let call = Call::VerifyParticipation {
        session_id: SessionId(args.session_id),
        secret,
        location: Location::new(args.lat, args.lon),
    };
    transact_and_report(&ledger, args.caller, call, args.json);
}
