//! Core domain concepts shared across all subdomains.
//!
//! - [`agent_kind::AgentKind`] — validated agent identifiers
//! - [`message::UserMessage`] — a validated user message
//! - [`error::DomainError`] — domain-level errors
//! - [`validation::ConfigIssue`] — non-fatal configuration problems

pub mod agent_kind;
pub mod error;
pub mod message;
pub mod validation;
