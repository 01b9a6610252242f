//! # crew-core
//!
//! Core types, lifecycle rules, and error types for Crew.
//!
//! This crate provides the foundational types shared across all Crew crates:
//! - Entity structs (tasks, claims, audit entries)
//! - Status enums with state machine transitions
//! - The pure coordination rules: staleness, claim ordering, assignee eligibility
//! - ID prefix constants
//! - Cross-cutting error types
//! - CLI response types

pub mod actor;
pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod lifecycle;
pub mod responses;
