// Re-export glam for convenience
pub use glam::*;

// raylite math types
mod interval;
mod transform;

pub use interval::Interval;
pub use transform::{rotation_onto_z, Mat4Ext};

/// Distances below this are treated as zero by intersection code.
pub const RAY_SMALL: f32 = 0.00001;

/// Threshold used by shading code to treat a scalar as zero.
pub const R_SMALL4: f32 = 0.0001;
