pub mod players;
pub mod ranking;
pub mod status;
