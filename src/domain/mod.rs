//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, events, errors)
//! - `catalog` - The criteria registry: drills, phases, criteria, dimensions, modes
//! - `session` - Practice session lifecycle, exchange log, and per-mode progress
//! - `scoring` - Score records, the grader, and derived dimension scores
//! - `analysis` - Pattern classification, trends, and the insights access gate
//! - `membership` - Plan tiers and their limits
//! - `notification` - Email triggers and their idempotency records

pub mod analysis;
pub mod catalog;
pub mod foundation;
pub mod membership;
pub mod notification;
pub mod scoring;
pub mod session;
