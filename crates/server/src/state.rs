//! Shared application state

use crate::session::{DashSessionStore, TurnGates};
use brewflow_agent::Agent;
use brewflow_config::Settings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub sessions: Arc<DashSessionStore>,
    pub gates: Arc<TurnGates>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(agent: Arc<Agent>, sessions: Arc<DashSessionStore>, settings: Settings) -> Self {
        Self {
            agent,
            sessions,
            gates: Arc::new(TurnGates::new()),
            settings: Arc::new(settings),
        }
    }
}
