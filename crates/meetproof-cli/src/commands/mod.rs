pub mod create_session;
pub mod errors;
pub mod init;
pub mod mine;
pub mod replay;
pub mod session;
pub mod set_paused;
pub mod status;
pub mod verify_participation;
