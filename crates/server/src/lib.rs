//! HTTP transport for the brewflow agent
//!
//! A thin layer: one chat endpoint plus health/readiness. The one
//! guarantee it owns is turn ordering: a per-session lock ensures at
//! most one in-flight turn per session, which the agent's
//! read-modify-write requires.

pub mod http;
pub mod session;
pub mod state;

pub use http::create_router;
pub use session::{DashSessionStore, TurnGates};
pub use state::AppState;
