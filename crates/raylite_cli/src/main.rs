//! raylite CLI - renders a demo scene with the CPU ray tracer
//!
//! Writes the image as raw RGBA bytes and optionally the POV-Ray scene.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use raylite_core::{Color, Material, RenderSettings, Texture};
use raylite_math::{Mat4, Vec3};
use raylite_renderer::{RayTracer, RenderRequest};

/// View volume of the demo scene: x, y and z ranges in view space.
const VOLUME: [f32; 6] = [-8.0, 8.0, -6.0, 6.0, 0.0, 80.0];
const FRONT: f32 = 1.0;
const BACK: f32 = 80.0;
const FOV: f32 = 20.0;

#[derive(Parser, Debug)]
#[command(name = "raylite")]
#[command(about = "Ray trace spheres, cylinders and triangles on the CPU", long_about = None)]
struct Options {
    /// Render settings as JSON (missing fields use defaults)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Output size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size, default_value = "640x480")]
    size: (u32, u32),
    /// Seed for the scatter texture
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Raw RGBA output file
    #[arg(long)]
    out: Option<PathBuf>,
    /// POV-Ray scene output file
    #[arg(long)]
    pov: Option<PathBuf>,
}

fn parse_size(size: &str) -> Result<(u32, u32), String> {
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| format!("size must look like 640x480, got {size}"))?;
    let width = w.parse().map_err(|_| format!("invalid width: {w}"))?;
    let height = h.parse().map_err(|_| format!("invalid height: {h}"))?;
    Ok((width, height))
}

/// A small molecule-like scene: atoms, bonds between them and a floor.
fn build_demo_scene(tracer: &mut RayTracer) {
    let atoms = [
        (Vec3::new(-3.0, 0.0, -30.0), Color::new(0.9, 0.2, 0.2)),
        (Vec3::new(0.0, 1.5, -32.0), Color::new(0.3, 0.3, 0.9)),
        (Vec3::new(3.0, 0.0, -30.0), Color::new(0.2, 0.8, 0.3)),
        (Vec3::new(0.0, -2.0, -28.0), Color::new(0.9, 0.9, 0.2)),
    ];

    for (i, (center, color)) in atoms.iter().enumerate() {
        let mut material = Material::new(*color);
        if i == 1 {
            material = material.with_texture(Texture::Wiggle {
                amplitude: 0.1,
                frequency: 4.0,
            });
        }
        if i == 3 {
            material = material.with_transparency(0.4);
        }
        tracer.add_sphere(*center, 1.2, material);
    }

    for pair in [(0, 1), (1, 2), (0, 3), (2, 3)] {
        let (start, c1) = atoms[pair.0];
        let (end, c2) = atoms[pair.1];
        let bond = Material::default().with_texture(Texture::Scatter { weight: 0.05 });
        tracer.add_cylinder(start, end, 0.3, [c1, c2], bond);
    }

    let floor = Material::new(Color::splat(0.7));
    let corners = [
        Vec3::new(-10.0, -4.0, -20.0),
        Vec3::new(10.0, -4.0, -20.0),
        Vec3::new(10.0, -4.0, -45.0),
        Vec3::new(-10.0, -4.0, -45.0),
    ];
    let up = [Vec3::Y; 3];
    let grey = [Color::splat(0.7); 3];
    tracer.add_triangle([corners[0], corners[1], corners[2]], up, grey, floor);
    tracer.add_triangle([corners[0], corners[2], corners[3]], up, grey, floor);
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let options = Options::parse();
    let (width, height) = options.size;

    let settings = match &options.settings {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => RenderSettings::default(),
    };

    // Tilt the scene slightly so the floor is visible
    let view = Mat4::from_rotation_x(0.25);

    let mut tracer = RayTracer::new(settings).with_progress(|done, total| {
        if done == total || done % 8 == 0 {
            log::info!("{}/{} buckets", done, total);
        }
    });
    tracer.prepare(VOLUME, view.to_cols_array());
    build_demo_scene(&mut tracer);

    let request = RenderRequest::new(width, height, FRONT, BACK).with_seed(options.seed);
    let image = tracer.render(&request)?;

    let corner = image.pixels().first().copied().unwrap_or_default();
    let covered = image.pixels().iter().filter(|&&pixel| pixel != corner).count();
    log::info!(
        "Rendered {}x{}: {} pixels differ from the corner pixel",
        width,
        height,
        covered
    );

    if let Some(path) = &options.out {
        fs::write(path, image.to_rgba_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Wrote raw RGBA to {}", path.display());
    }

    if let Some(path) = &options.pov {
        fs::write(path, tracer.export_pov(FRONT, FOV))
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Wrote POV-Ray scene to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("raylite").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.size, (640, 480));
        assert_eq!(options.seed, 0);
        assert!(options.out.is_none());
        assert!(options.settings.is_none());
    }

    #[test]
    fn test_size_and_seed() {
        let options = parse(&["--size", "320x200", "--seed", "42", "--pov", "scene.pov"]).unwrap();
        assert_eq!(options.size, (320, 200));
        assert_eq!(options.seed, 42);
        assert_eq!(options.pov, Some(PathBuf::from("scene.pov")));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse(&["--size", "320"]).is_err());
        assert!(parse(&["--size", "320xabc"]).is_err());
        assert!(parse(&["--out"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("16x9"), Ok((16, 9)));
        assert!(parse_size("16by9").is_err());
    }

    #[test]
    fn test_demo_scene_counts() {
        let mut tracer = RayTracer::default();
        build_demo_scene(&mut tracer);
        assert_eq!(tracer.store().len(), 10);
    }
}
