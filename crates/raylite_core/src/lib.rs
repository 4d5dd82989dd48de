//! raylite core - scene primitives and render configuration.
//!
//! This crate provides:
//!
//! - **Primitives**: `Sphere`, `Cylinder`, `Triangle` behind the closed
//!   `Primitive` enum
//! - **Materials**: immutable `Material` values captured when a primitive is
//!   added
//! - **Store**: `PrimitiveStore`, the append-only list the renderer expands
//! - **Settings**: `RenderSettings`, the lighting/fog/antialias knobs
//!
//! # Example
//!
//! ```ignore
//! use raylite_core::{Material, PrimitiveStore};
//! use raylite_math::Vec3;
//!
//! let mut store = PrimitiveStore::new();
//! let red = Material::new(Vec3::new(1.0, 0.0, 0.0));
//! store.add_sphere(Vec3::ZERO, 1.5, red);
//! store.add_sphere(Vec3::X * 3.0, 1.0, red.with_transparency(0.5));
//! ```

pub mod error;
pub mod material;
pub mod primitive;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use error::{SettingsError, SettingsResult};
pub use material::{Color, Material, Texture};
pub use primitive::{Cylinder, Primitive, PrimitiveKind, Sphere, Triangle};
pub use settings::{Fog, RenderSettings};
pub use store::PrimitiveStore;
