//! Upload-session state machine.
//!
//! This module provides the session lifecycle primitives:
//! - `SessionStatus` / `SessionSnapshot` / `Outcome` data model
//! - `SessionRegistry`, the single source of truth for session state,
//!   with the atomic collecting-to-processing transition

mod registry;
mod session;

pub use registry::{AppendReceipt, Begin, SessionRegistry};
pub use session::{Outcome, SessionSnapshot, SessionStatus};
