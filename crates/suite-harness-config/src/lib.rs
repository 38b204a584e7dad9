// crates/suite-harness-config/src/lib.rs
// ============================================================================
// Module: Suite Harness Config Library
// Description: Canonical config model and validation for the lifecycle harness.
// Purpose: Single source of truth for suite-harness.toml semantics.
// Dependencies: suite-harness-core, serde, toml
// ============================================================================

//! ## Overview
//! `suite-harness-config` defines the configuration model for the lifecycle
//! harness: expected component kinds, the audit sink, the equivalence rule's
//! ignored fields, and the fixture root. Loading is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::CONFIG_ENV_VAR;
pub use env::read_env_strict;
