//! Per-frame scene assembly for face overlays.
//!
//! Every frame the presenter rebuilds the camera from the canvas size, adds a
//! background plane that exactly fills the view at a fixed depth, adds one
//! overlay node per face with a usable pose, hands the scene to a
//! [`Renderer`], and then strips every transient node again so the scene
//! never accumulates stale objects.

use crate::{
    asset::ModelAsset,
    catalog::ModelConfig,
    constants::{
        DIR_LIGHT_COLOR, DIR_LIGHT_POSITION, FAR_PLANE, FOV_DEGREES, HEMI_GROUND_COLOR, HEMI_LIGHT_POSITION,
        HEMI_SKY_COLOR, NEAR_PLANE, SCENE_BACKGROUND, VIDEO_DEPTH,
    },
    interaction::CanvasSize,
    landmarks::{FaceGeometry, PoseTransform},
    Result,
};
use log::debug;
use nalgebra::{Matrix4, Perspective3, Point3, Rotation3, Vector3};
use std::sync::Arc;

/// Perspective camera at the origin looking down -z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn for_canvas(canvas: CanvasSize, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect: canvas.aspect(),
            near,
            far,
        }
    }

    pub fn projection(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fov_degrees.to_radians(), self.near, self.far).to_homogeneous()
    }

    /// Width and height of the visible area at a given distance
    pub fn viewport_at_depth(&self, depth: f32) -> (f32, f32) {
        let height = 2.0 * depth * (0.5 * self.fov_degrees.to_radians()).tan();
        (height * self.aspect, height)
    }
}

/// Background plane showing the current video frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoPlane {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl VideoPlane {
    /// Plane at `depth` that exactly fills the camera's view
    pub fn filling(camera: &PerspectiveCamera, depth: f32) -> Self {
        let (width, height) = camera.viewport_at_depth(depth);
        Self { width, height, depth }
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(0.0, 0.0, -self.depth)
    }
}

/// Scene light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Hemisphere { sky: u32, ground: u32, position: Point3<f32> },
    Directional { color: u32, position: Point3<f32> },
}

/// Model clone placed on one face
#[derive(Debug, Clone)]
pub struct OverlayNode {
    pub asset: Arc<ModelAsset>,
    /// Model-to-camera transform
    pub world: Matrix4<f32>,
    pub color: [u8; 3],
}

/// Node in the scene graph
#[derive(Debug, Clone)]
pub enum SceneNode {
    Light(Light),
    VideoPlane(VideoPlane),
    Overlay(OverlayNode),
}

impl SceneNode {
    /// Transient nodes live for a single frame
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::Light(_))
    }
}

/// Flat scene graph
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: u32,
    nodes: Vec<SceneNode>,
}

impl Scene {
    /// Scene with the default hemisphere and directional lights
    pub fn lit() -> Self {
        let mut scene = Self {
            background: SCENE_BACKGROUND,
            nodes: Vec::new(),
        };
        scene.add(SceneNode::Light(Light::Hemisphere {
            sky: HEMI_SKY_COLOR,
            ground: HEMI_GROUND_COLOR,
            position: Point3::from(HEMI_LIGHT_POSITION),
        }));
        scene.add(SceneNode::Light(Light::Directional {
            color: DIR_LIGHT_COLOR,
            position: Point3::from(DIR_LIGHT_POSITION),
        }));
        scene
    }

    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Light(light) => Some(light),
            _ => None,
        })
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlayNode> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Overlay(overlay) => Some(overlay),
            _ => None,
        })
    }

    pub fn video_plane(&self) -> Option<&VideoPlane> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::VideoPlane(plane) => Some(plane),
            _ => None,
        })
    }

    pub fn transient_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_transient()).count()
    }

    /// Remove every per-frame node
    pub fn clear_transient(&mut self) {
        self.nodes.retain(|n| !n.is_transient());
    }
}

/// Local transform of a model clone: translate, then rotate (XYZ), then scale
pub fn model_transform(config: &ModelConfig) -> Matrix4<f32> {
    let [px, py, pz] = config.position;
    let [rx, ry, rz] = config.rotation;
    let [sx, sy, sz] = config.scale;
    // XYZ intrinsic order: R = Rx * Ry * Rz
    let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), rx)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), rz);
    Matrix4::new_translation(&Vector3::new(px, py, pz))
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Place a model clone on a face
#[must_use]
pub fn project_overlay(asset: &Arc<ModelAsset>, config: &ModelConfig, pose: &PoseTransform) -> OverlayNode {
    OverlayNode {
        asset: Arc::clone(asset),
        world: pose.matrix() * model_transform(config),
        color: config.color,
    }
}

/// Drawing backend for an assembled scene
pub trait Renderer {
    /// Image type shown on the background plane
    type Frame;

    /// Draw the scene as seen by the camera
    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera, background: &Self::Frame) -> Result<()>;
}

/// Counts from one presented frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub overlays: usize,
    pub skipped: usize,
}

/// Assembles, draws and tears down the per-frame scene
pub struct ScenePresenter {
    scene: Scene,
    camera: PerspectiveCamera,
    fov_degrees: f32,
    near: f32,
    far: f32,
    video_depth: f32,
}

impl ScenePresenter {
    pub fn new(fov_degrees: f32, near: f32, far: f32, video_depth: f32) -> Self {
        Self {
            scene: Scene::lit(),
            camera: PerspectiveCamera::for_canvas(CanvasSize::new(1.0, 1.0), fov_degrees, near, far),
            fov_degrees,
            near,
            far,
            video_depth,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub const fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Present one frame
    ///
    /// Faces are skipped when no model is loaded or their pose is missing.
    /// Transient nodes are removed before any draw error is returned.
    pub fn render<R: Renderer>(
        &mut self,
        renderer: &mut R,
        background: &R::Frame,
        canvas: CanvasSize,
        faces: &[FaceGeometry],
        model: Option<(&Arc<ModelAsset>, &ModelConfig)>,
    ) -> Result<FrameStats> {
        self.camera = PerspectiveCamera::for_canvas(canvas, self.fov_degrees, self.near, self.far);
        self.scene
            .add(SceneNode::VideoPlane(VideoPlane::filling(&self.camera, self.video_depth)));

        let mut stats = FrameStats::default();
        for face in faces {
            let (Some((asset, config)), Some(pose)) = (model, face.pose.as_ref()) else {
                stats.skipped += 1;
                continue;
            };
            self.scene.add(SceneNode::Overlay(project_overlay(asset, config, pose)));
            stats.overlays += 1;
        }
        if stats.skipped > 0 {
            debug!("Skipped {} face(s) without model or pose", stats.skipped);
        }

        let drawn = renderer.draw(&self.scene, &self.camera, background);
        self.scene.clear_transient();
        drawn.map(|()| stats)
    }
}

impl Default for ScenePresenter {
    fn default() -> Self {
        Self::new(FOV_DEGREES, NEAR_PLANE, FAR_PLANE, VIDEO_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::button_presets;

    #[test]
    fn test_video_plane_fills_view() {
        let camera = PerspectiveCamera::for_canvas(CanvasSize::new(1280.0, 720.0), 63.0, 1.0, 10_000.0);
        let plane = VideoPlane::filling(&camera, 500.0);
        let expected_h = 2.0 * 500.0 * (31.5f32).to_radians().tan();
        assert!((plane.height - expected_h).abs() < 1e-3);
        assert!((plane.width - expected_h * 1280.0 / 720.0).abs() < 1e-3);

        // the plane's corners project to the NDC corners
        let corner = camera.projection() * nalgebra::Vector4::new(plane.width / 2.0, plane.height / 2.0, -500.0, 1.0);
        assert!((corner.x / corner.w - 1.0).abs() < 1e-4);
        assert!((corner.y / corner.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_model_transform_order() {
        let mut config = button_presets().remove(0);
        config.scale = [2.0, 2.0, 2.0];
        config.rotation = [0.0, std::f32::consts::FRAC_PI_2, 0.0];
        config.position = [0.0, 0.0, -5.0];
        let m = model_transform(&config);
        // scale, then rotate +x onto -z, then translate
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-5);
        assert!((p.z - -7.0).abs() < 1e-5);
    }

    #[test]
    fn test_project_overlay_applies_pose_last() {
        let asset = Arc::new(ModelAsset::parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap());
        let config = button_presets().remove(0);
        let pose = PoseTransform::new(Matrix4::new_translation(&Vector3::new(0.0, 0.0, -60.0)));
        let node = project_overlay(&asset, &config, &pose);
        let origin = node.world.transform_point(&Point3::origin());
        assert_eq!(origin, Point3::new(0.0, 0.0, -65.0));
        assert_eq!(node.color, config.color);
    }

    #[test]
    fn test_lights_are_persistent() {
        let mut scene = Scene::lit();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.transient_count(), 0);
        scene.add(SceneNode::VideoPlane(VideoPlane {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }));
        scene.clear_transient();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.lights().count(), 2);
    }
}
