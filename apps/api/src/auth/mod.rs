//! Authentication: Google OAuth2 handshake, `tower-sessions` cookie sessions
//! and the per-request authorization gate used by protected handlers.

pub mod gate;
pub mod google;
pub mod handlers;
pub mod session;
