// crates/suite-harness-core/src/core/mod.rs
// ============================================================================
// Module: Suite Harness Core Types
// Description: Identifiers and entity surface shared across the harness.
// Purpose: Group the plain data types consumed by interfaces and runtime.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types are plain data: identifiers and the entity snapshot surface.
//! They carry no host state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod entity;
pub mod identifiers;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use entity::Entity;
pub use entity::EntitySnapshot;
pub use entity::SeededGroup;
pub use entity::SeededObject;
pub use entity::User;
pub use identifiers::ComponentKind;
pub use identifiers::EntityGuid;
pub use identifiers::EntityKind;
pub use identifiers::ServiceName;
