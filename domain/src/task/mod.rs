//! Agent task domain
//!
//! Tasks are owned by the remote execution backend and mirrored read-mostly
//! on the client. The only client-side write paths are the cancel, approve,
//! and reject commands.

pub mod action;
pub mod activity;
pub mod entities;
pub mod status;
