//! Core types for Virtual World: grid points, entities, and the world model.
//!
//! This crate holds the passive data model that the simulation engine mutates.
//! It knows nothing about scheduling; [`WorldModel`] only enforces placement
//! rules (at most one entity per cell) and answers spatial queries.

/// Entity kinds, arena identifiers, and kind-specific factories.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The opaque image/frame provider seam.
pub mod image;
/// Integer grid coordinates.
pub mod point;
/// The occupancy grid and live-entity registry.
pub mod world;

/// Re-export core entity types.
pub use entity::{Entity, EntityId, EntityKind};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export image provider types.
pub use image::{Frames, ImageStore, StaticImageStore};
/// Re-export the grid coordinate.
pub use point::Point;
/// Re-export world model types.
pub use world::{Background, WorldModel};
