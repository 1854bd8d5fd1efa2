//! OpenCV rendering backend.
//!
//! The background plane always fills the view exactly, so drawing it amounts
//! to resizing the video frame onto the canvas. Overlays are projected
//! triangle by triangle, flat shaded from the scene lights, and painted
//! back to front.

use crate::{
    scene::{Light, OverlayNode, PerspectiveCamera, Renderer, Scene},
    utils::{rgb_hex_to_scalar, rgb_to_scalar, safe_cast::f32_to_i32_clamp},
    Result,
};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use opencv::{
    core::{Mat, Point, Size, Vector, CV_8UC3},
    imgproc::{self, InterpolationFlags, LINE_AA},
    prelude::*,
};

/// Triangle ready to be filled
#[derive(Debug, Clone)]
pub struct ShadedTriangle {
    pub points: [(f32, f32); 3],
    /// Mean view-space depth (more negative is farther)
    pub depth: f32,
    pub color: [u8; 3],
}

/// Resolved light contributions for flat shading
#[derive(Debug, Clone, Copy)]
struct Lighting {
    sky: Vector3<f32>,
    ground: Vector3<f32>,
    up: Vector3<f32>,
    sun: Vector3<f32>,
    sun_dir: Vector3<f32>,
}

impl Lighting {
    fn from_scene(scene: &Scene) -> Self {
        let mut lighting = Self {
            sky: Vector3::zeros(),
            ground: Vector3::zeros(),
            up: Vector3::y(),
            sun: Vector3::zeros(),
            sun_dir: Vector3::y(),
        };
        for light in scene.lights() {
            match *light {
                Light::Hemisphere { sky, ground, position } => {
                    lighting.sky = unpack_rgb(sky);
                    lighting.ground = unpack_rgb(ground);
                    lighting.up = position.coords.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
                }
                Light::Directional { color, position } => {
                    lighting.sun = unpack_rgb(color);
                    lighting.sun_dir = position.coords.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
                }
            }
        }
        lighting
    }

    /// Light reaching a surface with the given normal, per channel in 0..=2
    fn irradiance(&self, normal: &Vector3<f32>) -> Vector3<f32> {
        let hemi_weight = 0.5 * normal.dot(&self.up) + 0.5;
        let hemi = self.ground.lerp(&self.sky, hemi_weight);
        let diffuse = self.sun * normal.dot(&self.sun_dir).max(0.0);
        hemi + diffuse
    }
}

fn unpack_rgb(hex: u32) -> Vector3<f32> {
    let [_, r, g, b] = hex.to_be_bytes();
    Vector3::new(f32::from(r), f32::from(g), f32::from(b)) / 255.0
}

fn shade(base: [u8; 3], light: &Vector3<f32>) -> [u8; 3] {
    let channel = |c: u8, l: f32| (f32::from(c) * l * 0.6).clamp(0.0, 255.0) as u8;
    [
        channel(base[0], light.x),
        channel(base[1], light.y),
        channel(base[2], light.z),
    ]
}

/// Project an overlay into canvas-space triangles
///
/// Triangles facing away from the camera or crossing the near plane are
/// dropped.
pub fn rasterize_overlay(
    overlay: &OverlayNode,
    projection: &Matrix4<f32>,
    near: f32,
    width: f32,
    height: f32,
    scene: &Scene,
) -> Vec<ShadedTriangle> {
    let lighting = Lighting::from_scene(scene);
    let view: Vec<Point3<f32>> = overlay
        .asset
        .vertices
        .iter()
        .map(|v| overlay.world.transform_point(v))
        .collect();

    let mut triangles = Vec::with_capacity(overlay.asset.triangles.len());
    for &[a, b, c] in &overlay.asset.triangles {
        let (pa, pb, pc) = (view[a], view[b], view[c]);
        if pa.z > -near || pb.z > -near || pc.z > -near {
            continue;
        }
        let Some(normal) = (pb - pa).cross(&(pc - pa)).try_normalize(f32::EPSILON) else {
            continue;
        };
        // camera sits at the origin
        if normal.dot(&pa.coords) >= 0.0 {
            continue;
        }

        let to_screen = |p: &Point3<f32>| {
            let clip = projection * Vector4::new(p.x, p.y, p.z, 1.0);
            let ndc_x = clip.x / clip.w;
            let ndc_y = clip.y / clip.w;
            ((ndc_x + 1.0) * 0.5 * width, (1.0 - ndc_y) * 0.5 * height)
        };

        triangles.push(ShadedTriangle {
            points: [to_screen(&pa), to_screen(&pb), to_screen(&pc)],
            depth: (pa.z + pb.z + pc.z) / 3.0,
            color: shade(overlay.color, &lighting.irradiance(&normal)),
        });
    }
    triangles
}

/// Renderer drawing into an owned BGR canvas
pub struct OpenCvRenderer {
    canvas: Mat,
    width: i32,
    height: i32,
}

impl OpenCvRenderer {
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be allocated
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let canvas = Mat::zeros(height, width, CV_8UC3)?.to_mat()?;
        Ok(Self { canvas, width, height })
    }

    /// Last drawn image
    pub const fn canvas(&self) -> &Mat {
        &self.canvas
    }

    /// Mutable access for HUD drawing on top of the scene
    pub fn canvas_mut(&mut self) -> &mut Mat {
        &mut self.canvas
    }

    fn resize_canvas(&mut self, width: i32, height: i32) -> Result<()> {
        if width != self.width || height != self.height {
            self.canvas = Mat::zeros(height, width, CV_8UC3)?.to_mat()?;
            self.width = width;
            self.height = height;
        }
        Ok(())
    }

    fn draw_background(&mut self, scene: &Scene, background: &Mat) -> Result<()> {
        if scene.video_plane().is_some() && !background.empty() {
            imgproc::resize(
                background,
                &mut self.canvas,
                Size::new(self.width, self.height),
                0.0,
                0.0,
                InterpolationFlags::INTER_LINEAR as i32,
            )?;
        } else {
            self.canvas
                .set_to(&rgb_hex_to_scalar(scene.background), &Mat::default())?;
        }
        Ok(())
    }
}

impl Renderer for OpenCvRenderer {
    type Frame = Mat;

    #[allow(clippy::cast_precision_loss)] // canvas sizes fit in f32
    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera, background: &Mat) -> Result<()> {
        // the camera aspect defines the canvas; keep the height and derive the width
        let height = if background.empty() { self.height } else { background.rows() };
        let width = f32_to_i32_clamp((height as f32 * camera.aspect).round(), 1, i32::MAX);
        self.resize_canvas(width, height)?;
        self.draw_background(scene, background)?;

        let projection = camera.projection();
        let mut triangles: Vec<ShadedTriangle> = scene
            .overlays()
            .flat_map(|overlay| {
                rasterize_overlay(overlay, &projection, camera.near, width as f32, height as f32, scene)
            })
            .collect();
        // painter's algorithm: farthest first
        triangles.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        for triangle in &triangles {
            let points: Vector<Point> = triangle
                .points
                .iter()
                .map(|&(x, y)| {
                    Point::new(
                        f32_to_i32_clamp(x, -4 * width, 5 * width),
                        f32_to_i32_clamp(y, -4 * height, 5 * height),
                    )
                })
                .collect();
            imgproc::fill_convex_poly(
                &mut self.canvas,
                &points,
                rgb_to_scalar(triangle.color),
                LINE_AA,
                0,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{asset::ModelAsset, interaction::CanvasSize};
    use std::sync::Arc;

    fn triangle_node(z: f32, winding_ccw: bool) -> OverlayNode {
        let obj = if winding_ccw {
            "v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1 2 3\n"
        } else {
            "v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1 3 2\n"
        };
        OverlayNode {
            asset: Arc::new(ModelAsset::parse_obj(obj).unwrap()),
            world: Matrix4::new_translation(&Vector3::new(0.0, 0.0, z)),
            color: [200, 200, 200],
        }
    }

    #[test]
    fn test_rasterize_front_facing_triangle() {
        let camera = PerspectiveCamera::for_canvas(CanvasSize::new(640.0, 480.0), 63.0, 1.0, 10_000.0);
        let scene = Scene::lit();
        let tris = rasterize_overlay(&triangle_node(-10.0, true), &camera.projection(), 1.0, 640.0, 480.0, &scene);
        assert_eq!(tris.len(), 1);
        // apex is above the centre of the canvas
        let (ax, ay) = tris[0].points[2];
        assert!((ax - 320.0).abs() < 1e-3);
        assert!(ay < 240.0);
        assert!(tris[0].color.iter().any(|&c| c > 0));
    }

    #[test]
    fn test_rasterize_culls_back_faces_and_near_plane() {
        let camera = PerspectiveCamera::for_canvas(CanvasSize::new(640.0, 480.0), 63.0, 1.0, 10_000.0);
        let scene = Scene::lit();
        let projection = camera.projection();
        assert!(rasterize_overlay(&triangle_node(-10.0, false), &projection, 1.0, 640.0, 480.0, &scene).is_empty());
        assert!(rasterize_overlay(&triangle_node(5.0, true), &projection, 1.0, 640.0, 480.0, &scene).is_empty());
    }

    #[test]
    fn test_unpack_rgb() {
        let c = unpack_rgb(0x00FF_8000);
        assert_eq!(c, Vector3::new(1.0, 128.0 / 255.0, 0.0));
    }
}
