//! Inspire Core
//!
//! Core types shared by the Inspire job monitor.
//!
//! This crate contains:
//! - Domain types: job status, status snapshots and timelines
//! - Transition detection between consecutive snapshots
//! - Display helpers for durations and epoch timestamps
//! - DTOs: wire shapes of the remote job API

pub mod domain;
pub mod dto;
pub mod format;
pub mod transition;
