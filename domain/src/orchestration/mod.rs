//! Orchestration domain
//!
//! How a user message is routed across the selected agent set: broadcast
//! (independent fan-out) or coordinate (one coordinating agent decomposes
//! the work).

pub mod mode;
pub mod selection;
