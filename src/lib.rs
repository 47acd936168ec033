//! Candor - Behavioral Communication Training
//!
//! This crate implements drill-based practice sessions with asynchronous
//! criteria scoring, longitudinal blind-spot analysis, and weekly progress
//! reporting.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
