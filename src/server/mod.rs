// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - The game registry (matchmaking, turn arbitration, event broadcast)
//! - Per-connection WebSocket session actors

pub mod state;
pub mod router;
pub mod registry;
pub mod ws_error;
