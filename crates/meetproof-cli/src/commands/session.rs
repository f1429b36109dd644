use crate::support::{
    exit_with_error, load_state_or_exit, open_ledger_or_exit, print_json_or_exit, yes_no,
};
use meetproof_kernel::{ErrorKind, MeetProof, Principal, SessionId};
use serde_json::{Value, json};

pub const SESSION_VIEW_KIND: &str = "meetproof.session_view.v1";

/// Read-only view of one session at `block_height`, or `None` if unknown.
pub fn session_view(
    contract: &MeetProof,
    session_id: SessionId,
    block_height: u64,
    participant: Option<&Principal>,
) -> Option<Value> {
    let session = contract.session(session_id)?;
    let status = session.status(block_height);
    let participants: Vec<Value> = contract
        .participants(session_id)
        .map(|p| json!({ "participant": p.participant, "block": p.block }))
        .collect();

    let mut view = json!({
        "schema": 1,
        "kind": SESSION_VIEW_KIND,
        "blockHeight": block_height,
        "session": session,
        "deadlineBlock": session.deadline_block(),
        "status": status,
        "phase": status.phase().as_str(),
        "participants": participants,
    });
    if let Some(principal) = participant
        && let Some(map) = view.as_object_mut()
    {
        map.insert(
            "hasParticipated".to_string(),
            Value::Bool(contract.has_participated(session_id, principal)),
        );
    }
    Some(view)
}

pub fn run(ledger_path: String, session_id: u64, participant: Option<String>, json_output: bool) {
    let ledger = open_ledger_or_exit(&ledger_path);
    let state = load_state_or_exit(&ledger);
    let id = SessionId(session_id);
    let participant = participant.map(Principal::new);

    let Some(view) = session_view(&state.contract, id, state.block_height, participant.as_ref())
    else {
        let kind = ErrorKind::SessionNotFound;
        exit_with_error(format!(
            "session {id} not found ({} {})",
            kind.as_str(),
            kind.code()
        ));
    };

    if json_output {
        print_json_or_exit(&view, "session");
        return;
    }

    let Some(session) = state.contract.session(id) else {
        return;
    };
    let status = session.status(state.block_height);
    println!("meetproof session {id}");
    println!();
    println!("  creator: {}", session.creator);
    println!("  location: {} radius {}m", session.location, session.radius);
    println!(
        "  created at block {}, open through block {}",
        session.created_at_block,
        session.deadline_block()
    );
    println!(
        "  participants: {} (min {}, max {})",
        session.participant_count, session.min_participants, session.max_participants
    );
    println!("  phase: {}", status.phase().as_str());
    println!("  confirmed: {}", yes_no(status.confirmed));
    for record in state.contract.participants(id) {
        println!("    {} at block {}", record.participant, record.block);
    }
    if let Some(principal) = &participant {
        println!(
            "  {principal} participated: {}",
            yes_no(state.contract.has_participated(id, principal))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetproof_kernel::{CallContext, Location, SessionParams};

    const SPOT: Location = Location::new(51_500_000, -120_000);

    fn engine_with_one_participant() -> MeetProof {
        let mut engine = MeetProof::deploy(Principal::new("deployer"));
        engine
            .create_session(
                &CallContext::new(Principal::new("wallet_1"), 5),
                SessionParams {
                    secret: b"bridge".to_vec(),
                    location: SPOT,
                    radius: 50,
                    duration_blocks: 3,
                    min_participants: 1,
                    max_participants: 2,
                },
            )
            .expect("session should be created");
        engine
            .verify_participation(
                &CallContext::new(Principal::new("wallet_2"), 6),
                SessionId(1),
                b"bridge",
                SPOT,
            )
            .expect("participation should verify");
        engine
    }

    #[test]
    fn view_reports_phase_and_participants() {
        let engine = engine_with_one_participant();
        let who = Principal::new("wallet_2");
        let view = session_view(&engine, SessionId(1), 6, Some(&who)).expect("session exists");

        assert_eq!(view["kind"], SESSION_VIEW_KIND);
        assert_eq!(view["deadlineBlock"], 8);
        assert_eq!(view["phase"], "confirmed");
        assert_eq!(view["status"]["open"], true);
        assert_eq!(view["hasParticipated"], true);
        assert_eq!(view["participants"][0]["participant"], "wallet_2");
        assert_eq!(view["session"]["participantCount"], 1);
    }

    #[test]
    fn view_tracks_expiry_and_unknown_sessions() {
        let engine = engine_with_one_participant();
        let view = session_view(&engine, SessionId(1), 9, None).expect("session exists");
        assert_eq!(view["phase"], "expired");
        assert!(view.get("hasParticipated").is_none());
        assert!(session_view(&engine, SessionId(2), 9, None).is_none());
    }
}
