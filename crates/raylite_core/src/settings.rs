//! Render configuration.
//!
//! Field names follow the settings vocabulary of the host application so a
//! settings dump can be fed back in as JSON unchanged. Missing fields take
//! their defaults.

use std::path::Path;

use raylite_math::{Interval, Vec3, R_SMALL4};
use serde::{Deserialize, Serialize};

use crate::error::SettingsResult;
use crate::material::Color;

/// Lighting, fog and output options for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Light reaching every surface regardless of orientation
    pub ambient: f32,
    /// Weight of the viewer-facing (headlight) term
    pub direct: f32,
    /// Weight of the directional light term
    pub reflect: f32,
    /// Exponent blended into the diffuse terms
    pub power: f32,
    /// Specular highlight exponent
    pub spec_power: f32,
    /// Specular highlight strength
    pub spec_reflect: f32,
    /// Display gamma; values near zero disable correction
    pub gamma: f32,
    /// Nonzero renders at 2x and downsamples
    pub antialias: u32,
    /// Skip triangles facing away from the viewer
    pub backface_cull: bool,
    /// Opaque background (alpha 255) instead of a transparent one
    pub ray_opaque_background: bool,
    /// Fog density; 0 disables fog
    pub ray_trace_fog: f32,
    /// Fraction of the clip range where fog starts
    pub ray_trace_fog_start: f32,
    pub bg_rgb: [f32; 3],
    /// Direction the light travels, in view space
    pub light: [f32; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            ambient: 0.14,
            direct: 0.45,
            reflect: 0.45,
            power: 1.0,
            spec_power: 60.0,
            spec_reflect: 0.5,
            gamma: 1.0,
            antialias: 0,
            backface_cull: false,
            ray_opaque_background: true,
            ray_trace_fog: 0.0,
            ray_trace_fog_start: 0.0,
            bg_rgb: [0.0, 0.0, 0.0],
            light: [-0.4, -0.4, -1.0],
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> SettingsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        log::debug!("Loaded render settings from {:?}", path);
        Ok(settings)
    }

    /// Exponent applied to pixel intensity (1 / gamma).
    pub fn gamma_exponent(&self) -> f32 {
        if self.gamma > R_SMALL4 {
            1.0 / self.gamma
        } else {
            1.0
        }
    }

    pub fn background(&self) -> Color {
        Vec3::from_array(self.bg_rgb)
    }

    pub fn light_direction(&self) -> Vec3 {
        Vec3::from_array(self.light)
    }

    pub fn antialias_enabled(&self) -> bool {
        self.antialias > 0
    }

    /// Fog parameters, or `None` when fog is off.
    ///
    /// A start within 1e-4 of 1.0 would divide by zero when remapping and
    /// disables fog.
    pub fn fog(&self) -> Option<Fog> {
        if self.ray_trace_fog == 0.0 {
            return None;
        }
        let start = self.ray_trace_fog_start;
        if start > R_SMALL4 {
            if (start - 1.0).abs() < R_SMALL4 {
                return None;
            }
            return Some(Fog {
                density: self.ray_trace_fog,
                start: Some(start),
            });
        }
        Some(Fog {
            density: self.ray_trace_fog,
            start: None,
        })
    }
}

/// Depth fog resolved from `RenderSettings`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub density: f32,
    /// Remaps the blend so fog begins at this fraction of the clip range
    pub start: Option<f32>,
}

impl Fog {
    /// Blend factor toward the background for a hit at `dist` inside `clip`.
    ///
    /// 0 keeps the surface color, 1 is pure background. Factors past 1,
    /// from densities above 1 or hits beyond the back plane, drop to 0.
    pub fn factor(&self, dist: f32, clip: Interval) -> f32 {
        let mut f = self.density * clip.fraction(dist);
        if let Some(start) = self.start {
            f = (f - start) / (1.0 - start);
        }
        if f > 1.0 {
            0.0
        } else {
            f.max(0.0)
        }
    }
}
