//! Integration tests for rtg-bot.
//!
//! These tests drive the full engine through the application layer:
//! - Quote placement from reference snapshots
//! - Fill → hedge → requote flow
//! - Exposure guards and rollback on terminal acks
//! - JSON-lines replay through the async event loop

pub mod common;
