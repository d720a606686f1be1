//! Gallery camera
//!
//! A right-handed camera looking down -Z. By default it is placed so that
//! the `z = 0` plane maps one world unit to one screen point, with the world
//! origin at the center of the screen and +Y pointing up.
//!
//! Screen coordinates are points (not pixels) with the origin at the top
//! left and +Y pointing down.

use std::f32::consts::{FRAC_PI_3, PI};

use tracing::debug;
use whimsy_animation::{Animatable, TweenProperty};
use whimsy_core::{DMat4, Mat4, Vec2, Vec3};

use crate::error::CameraError;

/// Default vertical field of view
pub const DEFAULT_FOV: f32 = FRAC_PI_3;
pub const DEFAULT_NEAR: f32 = 1.0;
pub const DEFAULT_FAR: f32 = 10_000.0;

type Result<T> = std::result::Result<T, CameraError>;

/// Projection used for the main scene
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    /// Parallel projection sized to the screen at the `z = 0` plane
    Orthographic,
}

#[derive(Clone, Debug)]
pub struct Camera {
    x: f32,
    y: f32,
    z: f32,
    fov: f32,
    near: f32,
    far: f32,
    width: f32,
    height: f32,
    contents_scale: f32,
    projection_mode: ProjectionMode,
    /// How far the look-at center follows the eye in x/y (1.0 = straight on)
    move_center_with_eye: f32,

    view: Mat4,
    prev_view: Mat4,
    projection: Mat4,
    ortho: Mat4,
    view_dirty: bool,
}

impl Camera {
    /// Create a camera for a `width` x `height` point screen
    pub fn new(width: f32, height: f32, contents_scale: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(CameraError::DegenerateCamera { reason: "screen size is zero" });
        }

        let mut camera = Self {
            x: 0.0,
            y: 0.0,
            z: pixel_perfect_distance(height, DEFAULT_FOV),
            fov: DEFAULT_FOV,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            width,
            height,
            contents_scale: if contents_scale > 0.0 { contents_scale } else { 1.0 },
            projection_mode: ProjectionMode::Perspective,
            move_center_with_eye: 1.0,
            view: Mat4::IDENTITY,
            prev_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            ortho: Mat4::IDENTITY,
            view_dirty: true,
        };
        camera.rebuild_projection();
        camera.update_view_matrix();
        camera.prev_view = camera.view;
        Ok(camera)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Position
    // ─────────────────────────────────────────────────────────────────────────

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn set_x(&mut self, x: f32) {
        self.x = x;
        self.view_dirty = true;
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
        self.view_dirty = true;
    }

    pub fn set_z(&mut self, z: f32) {
        self.z = z;
        self.view_dirty = true;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.x = position.x;
        self.y = position.y;
        self.z = position.z;
        self.view_dirty = true;
    }

    /// Distance at which the `z = 0` plane is drawn one unit per point
    pub fn pixel_perfect_z(&self) -> f32 {
        pixel_perfect_distance(self.height, self.fov)
    }

    pub fn move_center_with_eye(&self) -> f32 {
        self.move_center_with_eye
    }

    pub fn set_move_center_with_eye(&mut self, factor: f32) {
        self.move_center_with_eye = factor;
        self.view_dirty = true;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lens
    // ─────────────────────────────────────────────────────────────────────────

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection_mode
    }

    /// Vertical field of view in radians
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.rebuild_projection();
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.rebuild_projection();
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        if self.projection_mode != mode {
            debug!(?mode, "camera projection mode changed");
        }
        self.projection_mode = mode;
        self.rebuild_projection();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Screen
    // ─────────────────────────────────────────────────────────────────────────

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn contents_scale(&self) -> f32 {
        self.contents_scale
    }

    /// Backing size in pixels
    pub fn drawable_size(&self) -> (u32, u32) {
        (
            (self.width * self.contents_scale).round() as u32,
            (self.height * self.contents_scale).round() as u32,
        )
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Resize the screen; rebuilds projection and ortho
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.rebuild_projection();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Matrices
    // ─────────────────────────────────────────────────────────────────────────

    /// View matrix reflecting the current position
    ///
    /// If the camera moved since the last [`Camera::update_view_matrix`] the
    /// view is recomputed on the fly.
    pub fn view(&self) -> Mat4 {
        if self.view_dirty {
            self.compute_view()
        } else {
            self.view
        }
    }

    /// View matrix of the previous completed frame
    pub fn prev_view(&self) -> Mat4 {
        self.prev_view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Pixel space orthographic matrix for overlays, independent of the
    /// projection mode. Maps `(0, 0)` to the top left corner.
    pub fn ortho(&self) -> Mat4 {
        self.ortho
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection.mul(&self.view())
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    /// Commit this frame's view, keeping the last one as `prev_view`
    pub fn update_view_matrix(&mut self) {
        self.prev_view = self.view;
        self.view = self.compute_view();
        self.view_dirty = false;
    }

    fn compute_view(&self) -> Mat4 {
        let eye = self.position();
        let m = self.move_center_with_eye;
        let center = Vec3::new(self.x * m, self.y * m, 0.0);
        Mat4::look_at_rh(eye, center, Vec3::UP)
    }

    fn rebuild_projection(&mut self) {
        let aspect = self.aspect();
        self.projection = match self.projection_mode {
            ProjectionMode::Perspective => Mat4::perspective_rh(self.fov, aspect, self.near, self.far),
            ProjectionMode::Orthographic => {
                let half_h = self.height / 2.0;
                let half_w = half_h * aspect;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        };
        self.ortho = Mat4::orthographic_rh(0.0, self.width, self.height, 0.0, -1.0, 1.0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Screen / world mapping
    // ─────────────────────────────────────────────────────────────────────────

    /// Reject configurations whose matrices cannot be inverted
    pub fn validate(&self) -> Result<()> {
        let reason = if !(self.width > 0.0 && self.height > 0.0) {
            Some("screen size is zero")
        } else if !(self.near.is_finite() && self.far.is_finite()) || (self.far - self.near).abs() <= f32::EPSILON {
            Some("near and far planes coincide")
        } else if self.projection_mode == ProjectionMode::Perspective && !(self.fov > 1e-4 && self.fov < PI) {
            Some("field of view is zero")
        } else if self.projection_mode == ProjectionMode::Perspective && self.near <= 0.0 {
            Some("near plane must be in front of the eye")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CameraError::DegenerateCamera { reason }),
            None => Ok(()),
        }
    }

    /// Screen mapping runs in f64 both ways; with `far / near` at 10^4 the
    /// f32 inverse is off by a visible fraction of a point.
    fn mapping_view_projection(&self) -> DMat4 {
        DMat4::from(self.projection).mul(&DMat4::from(self.view()))
    }

    fn inverse_view_projection(&self) -> Result<DMat4> {
        self.validate()?;
        self.mapping_view_projection()
            .try_inverse()
            .ok_or(CameraError::DegenerateCamera { reason: "view projection is singular" })
    }

    fn screen_to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(2.0 * screen.x / self.width - 1.0, 1.0 - 2.0 * screen.y / self.height)
    }

    fn unproject(&self, inverse: &DMat4, ndc: Vec2, depth: f32) -> Result<Vec3> {
        inverse
            .project_point(Vec3::new(ndc.x, ndc.y, depth))
            .ok_or(CameraError::DegenerateCamera { reason: "point unprojects to infinity" })
    }

    /// World position of `screen` on the near plane
    pub fn screen_to_world(&self, screen: Vec2) -> Result<Vec3> {
        let inverse = self.inverse_view_projection()?;
        self.unproject(&inverse, self.screen_to_ndc(screen), 0.0)
    }

    /// Ray through `screen`: origin on the near plane and unit direction
    pub fn screen_ray(&self, screen: Vec2) -> Result<(Vec3, Vec3)> {
        let inverse = self.inverse_view_projection()?;
        let ndc = self.screen_to_ndc(screen);
        let near = self.unproject(&inverse, ndc, 0.0)?;
        let far = self.unproject(&inverse, ndc, 1.0)?;
        Ok((near, (far - near).normalize()))
    }

    /// Where the ray through `screen` meets the plane at depth `z`
    pub fn screen_to_plane(&self, screen: Vec2, z: f32) -> Result<Vec3> {
        let (origin, direction) = self.screen_ray(screen)?;
        if direction.z.abs() <= f32::EPSILON {
            return Err(CameraError::NoIntersection { z });
        }
        let t = (z - origin.z) / direction.z;
        Ok(origin + direction * t)
    }

    /// Project a world point to screen points
    pub fn world_to_screen(&self, world: Vec3) -> Result<Vec2> {
        self.validate()?;
        let ndc = self
            .mapping_view_projection()
            .project_point(world)
            .ok_or(CameraError::DegenerateCamera { reason: "point projects to infinity" })?;
        Ok(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        ))
    }
}

fn pixel_perfect_distance(height: f32, fov: f32) -> f32 {
    (height / 2.0) / (fov / 2.0).tan()
}

impl Animatable for Camera {
    fn property(&self, property: TweenProperty) -> Option<f32> {
        match property {
            TweenProperty::X => Some(self.x),
            TweenProperty::Y => Some(self.y),
            TweenProperty::Z => Some(self.z),
            _ => None,
        }
    }

    fn set_property(&mut self, property: TweenProperty, value: f32) {
        match property {
            TweenProperty::X => self.set_x(value),
            TweenProperty::Y => self.set_y(value),
            TweenProperty::Z => self.set_z(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whimsy_core::approx_eq;

    fn camera() -> Camera {
        Camera::new(1024.0, 768.0, 2.0).unwrap()
    }

    #[test]
    fn test_pixel_perfect_default() {
        let camera = camera();
        let center = camera.world_to_screen(Vec3::ZERO).unwrap();
        assert!(approx_eq(center.x, 512.0, 0.05));
        assert!(approx_eq(center.y, 384.0, 0.05));

        // One unit on the z = 0 plane is one point on screen
        let right = camera.world_to_screen(Vec3::new(100.0, 100.0, 0.0)).unwrap();
        assert!(approx_eq(right.x, 612.0, 0.2));
        assert!(approx_eq(right.y, 284.0, 0.2));
    }

    #[test]
    fn test_screen_world_round_trip() {
        let mut camera = camera();
        camera.set_position(Vec3::new(40.0, -25.0, 500.0));
        camera.set_move_center_with_eye(0.5);
        camera.update_view_matrix();

        for screen in [Vec2::new(0.0, 0.0), Vec2::new(512.0, 384.0), Vec2::new(1000.0, 20.0), Vec2::new(77.0, 700.0)] {
            let world = camera.screen_to_world(screen).unwrap();
            let back = camera.world_to_screen(world).unwrap();
            assert!(back.distance(screen) < 0.05, "{screen:?} -> {back:?}");
        }
    }

    #[test]
    fn test_round_trip_orthographic() {
        let mut camera = camera();
        camera.set_projection_mode(ProjectionMode::Orthographic);
        let screen = Vec2::new(300.0, 200.0);
        let world = camera.screen_to_world(screen).unwrap();
        let back = camera.world_to_screen(world).unwrap();
        assert!(back.distance(screen) < 0.05);

        // Parallel rays: the ray through the screen hits z = 0 at the point
        // directly under it
        let hit = camera.screen_to_plane(screen, 0.0).unwrap();
        assert!(approx_eq(hit.x, world.x, 0.05));
        assert!(approx_eq(hit.y, world.y, 0.05));
    }

    #[test]
    fn test_screen_to_plane_hits_card_plane() {
        let camera = camera();
        let hit = camera.screen_to_plane(Vec2::new(612.0, 284.0), 0.0).unwrap();
        assert!(approx_eq(hit.x, 100.0, 0.5));
        assert!(approx_eq(hit.y, 100.0, 0.5));
        assert!(hit.z.abs() < 0.05);
    }

    #[test]
    fn test_screen_to_world_lies_on_near_plane() {
        let camera = camera();
        let world = camera.screen_to_world(Vec2::new(512.0, 384.0)).unwrap();
        assert!(approx_eq(world.z, camera.z() - camera.near(), 0.05));
    }

    #[test]
    fn test_degenerate_camera() {
        let mut camera = camera();
        camera.set_clip_planes(5.0, 5.0);
        assert!(matches!(
            camera.screen_to_world(Vec2::new(1.0, 1.0)),
            Err(CameraError::DegenerateCamera { .. })
        ));

        let mut camera = self::camera();
        camera.set_fov(0.0);
        assert!(matches!(
            camera.screen_to_world(Vec2::new(1.0, 1.0)),
            Err(CameraError::DegenerateCamera { .. })
        ));

        assert!(Camera::new(0.0, 768.0, 1.0).is_err());
    }

    #[test]
    fn test_prev_view_tracks_last_frame() {
        let mut camera = camera();
        let first = camera.view();

        camera.set_z(300.0);
        assert!(camera.is_view_dirty());
        // Read before the frame commit already reflects the move
        let moved = camera.view();
        assert_ne!(moved, first);
        assert_eq!(camera.prev_view(), first);

        camera.update_view_matrix();
        assert_eq!(camera.prev_view(), first);
        assert_eq!(camera.view(), moved);

        camera.update_view_matrix();
        assert_eq!(camera.prev_view(), moved);
    }

    #[test]
    fn test_ortho_is_top_left_pixel_space() {
        let camera = camera();
        let top_left = camera.ortho().project_point(Vec3::ZERO).unwrap();
        assert!(approx_eq(top_left.x, -1.0, 1e-5));
        assert!(approx_eq(top_left.y, 1.0, 1e-5));

        let bottom_right = camera.ortho().project_point(Vec3::new(1024.0, 768.0, 0.0)).unwrap();
        assert!(approx_eq(bottom_right.x, 1.0, 1e-5));
        assert!(approx_eq(bottom_right.y, -1.0, 1e-5));
        assert_eq!(camera.drawable_size(), (2048, 1536));
    }

    #[test]
    fn test_animatable_position() {
        let mut camera = camera();
        camera.set_property(TweenProperty::Z, 123.0);
        assert_eq!(camera.property(TweenProperty::Z), Some(123.0));
        assert!(camera.is_view_dirty());
        assert_eq!(camera.property(TweenProperty::Rx), None);
    }
}
