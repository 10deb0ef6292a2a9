/// Registry module: matchmaking, game lifecycle, and event broadcast.

pub mod server;
pub mod session;
pub mod messages;
