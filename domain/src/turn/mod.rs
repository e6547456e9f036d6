//! Conversation turn domain
//!
//! One turn = one user message plus the set of per-agent responses it
//! produced. Turns are owned exclusively by the orchestration core and are
//! immutable once every response settles.

pub mod entities;
pub mod response;
