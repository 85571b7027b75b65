//! Core types shared across the brewflow workspace
//!
//! Holds the qualification stage machine, customer typing, the error
//! taxonomy, and the turn request/response contract. No I/O lives here;
//! everything in this crate is plain data and pure functions.

pub mod customer;
pub mod error;
pub mod stage;
pub mod turn;

pub use customer::CustomerType;
pub use error::{Error, Result};
pub use stage::{ClosedReason, QualificationStage};
pub use turn::{TurnRequest, TurnResponse};
