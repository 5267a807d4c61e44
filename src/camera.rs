use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3 as Vec3};

use crate::transform::Transform;

#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fovy,
            aspect,
            near,
            far,
        }
    }

    pub fn get_mat(&self) -> Transform {
        *Transform::identity().set_perspective(self.fovy, self.aspect, self.near, self.far)
    }
}

/// 自由视角相机：eye + at + up
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3<f32>,
    pub target: Vec3<f32>,
    pub up: Vec3<f32>,
    frustum: Frustum,
    pub move_speed: f32,
    pub rotation_speed: f32,
    view: Transform,
    projection: Transform,
    last_mouse: Option<(f32, f32)>,
    dragging: bool,
    locked: bool,
}

impl Camera {
    pub fn new(position: Vec3<f32>, target: Vec3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::new(0.0, 1.0, 0.0),
            frustum: Frustum::new(50.0, aspect, 0.1, 100.0),
            move_speed: 0.5,
            rotation_speed: 0.15,
            view: Transform::identity(),
            projection: Transform::identity(),
            last_mouse: None,
            dragging: false,
            locked: false,
        };
        camera.calculate_view_projection();
        camera
    }

    pub fn view_matrix(&self) -> &Transform {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Transform {
        &self.projection
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.frustum.aspect = aspect;
        self.calculate_view_projection();
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn calculate_view_projection(&mut self) {
        self.view.set_look_at(self.position, self.target, self.up);
        self.projection = self.frustum.get_mat();
    }

    fn forward(&self) -> Vec3<f32> {
        let d = self.target - self.position;
        if d.magnitude2() <= f32::EPSILON {
            return Vec3::new(0.0, 0.0, 1.0);
        }
        d.normalize()
    }

    fn shift(&mut self, offset: Vec3<f32>) {
        if self.locked {
            return;
        }
        self.position += offset;
        self.target += offset;
        self.calculate_view_projection();
    }

    pub fn move_forward(&mut self) {
        let d = self.forward() * self.move_speed;
        self.shift(d);
    }

    pub fn move_backward(&mut self) {
        let d = self.forward() * -self.move_speed;
        self.shift(d);
    }

    pub fn move_left(&mut self) {
        let left = self.up.cross(self.forward());
        if left.magnitude2() <= f32::EPSILON {
            return;
        }
        let d = left.normalize() * self.move_speed;
        self.shift(d);
    }

    pub fn move_right(&mut self) {
        let right = self.forward().cross(self.up);
        if right.magnitude2() <= f32::EPSILON {
            return;
        }
        let d = right.normalize() * self.move_speed;
        self.shift(d);
    }

    pub fn turn_left(&mut self) {
        self.turn(-self.rotation_speed);
    }

    pub fn turn_right(&mut self) {
        self.turn(self.rotation_speed);
    }

    // 在 XZ 平面上绕 eye 旋转 at，高度不变
    fn turn(&mut self, delta: f32) {
        if self.locked {
            return;
        }
        let d = self.target - self.position;
        let r = (d.x * d.x + d.z * d.z).sqrt();
        let theta = d.z.atan2(d.x) + delta;
        self.target.x = self.position.x + r * theta.cos();
        self.target.z = self.position.z + r * theta.sin();
        self.calculate_view_projection();
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// 松开鼠标后清掉上一次的坐标，防止下次按下时视角跳变
    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.last_mouse = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// 鼠标拖拽观察，俯仰角限制在 ±π/2.5
    pub fn drag_to(&mut self, x: f32, y: f32) {
        if self.locked || !self.dragging {
            return;
        }
        let Some((last_x, last_y)) = self.last_mouse else {
            self.last_mouse = Some((x, y));
            return;
        };
        self.last_mouse = Some((x, y));

        let horizontal = (x - last_x) * self.rotation_speed / 40.0;
        let vertical = (y - last_y) * self.rotation_speed / 40.0;

        let d = self.target - self.position;
        let r = (d.x * d.x + d.z * d.z).sqrt();
        if r <= f32::EPSILON {
            return;
        }
        let theta = d.z.atan2(d.x) + horizontal;
        let new_x = r * theta.cos();
        let new_z = r * theta.sin();

        let distance = d.magnitude();
        let current_angle = d.y.atan2(r);
        let limit = PI / 2.5;
        let new_angle = (current_angle - vertical).clamp(-limit, limit);
        let new_height = distance * new_angle.sin();
        let new_radius = distance * new_angle.cos();

        self.target.x = self.position.x + new_x * new_radius / r;
        self.target.y = self.position.y + new_height;
        self.target.z = self.position.z + new_z * new_radius / r;
        self.calculate_view_projection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 2.0, -7.0), Vec3::new(0.0, 2.0, 100.0), 1.0)
    }

    #[test]
    fn forward_moves_eye_and_target_together() {
        let mut c = camera();
        let gap = c.target - c.position;
        c.move_forward();
        assert!((c.position.z - (-6.5)).abs() < 1e-5);
        assert!(((c.target - c.position) - gap).magnitude() < 1e-4);
        c.move_backward();
        assert!((c.position.z - (-7.0)).abs() < 1e-5);
    }

    #[test]
    fn strafing_is_perpendicular_to_view() {
        let mut c = camera();
        c.move_left();
        // 看向 +z 时左手边是 +x
        assert!((c.position.x - 0.5).abs() < 1e-5);
        assert!((c.position.z - (-7.0)).abs() < 1e-5);
        c.move_right();
        c.move_right();
        assert!((c.position.x - (-0.5)).abs() < 1e-5);
    }

    #[test]
    fn turning_keeps_distance_and_height() {
        let mut c = camera();
        let before = (c.target - c.position).magnitude();
        c.turn_left();
        c.turn_left();
        c.turn_right();
        let after = (c.target - c.position).magnitude();
        assert!((before - after).abs() < 1e-2);
        assert!((c.target.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn locked_camera_ignores_input() {
        let mut c = camera();
        c.set_locked(true);
        let (p, t) = (c.position, c.target);
        c.move_forward();
        c.move_left();
        c.turn_right();
        c.begin_drag();
        c.drag_to(0.0, 0.0);
        c.drag_to(100.0, 50.0);
        assert_eq!(c.position, p);
        assert_eq!(c.target, t);
    }

    #[test]
    fn first_drag_sample_only_records_position() {
        let mut c = camera();
        let t = c.target;
        c.begin_drag();
        c.drag_to(10.0, 10.0);
        assert_eq!(c.target, t);
        c.drag_to(60.0, 10.0);
        assert!(c.target != t);
        c.end_drag();
        let t = c.target;
        c.drag_to(200.0, 200.0);
        assert_eq!(c.target, t);
    }

    #[test]
    fn set_aspect_rebuilds_projection() {
        let mut c = camera();
        let square = *c.projection_matrix();
        c.set_aspect(2.0);
        let wide = *c.projection_matrix();
        assert_ne!(square, wide);
        // x 方向的缩放减半，y 不变
        assert!((wide.mat.x.x - square.mat.x.x / 2.0).abs() < 1e-5);
        assert!((wide.mat.y.y - square.mat.y.y).abs() < 1e-6);
        assert_eq!(*c.view_matrix(), *camera().view_matrix());
    }

    #[test]
    fn pitch_is_clamped() {
        let mut c = camera();
        c.begin_drag();
        c.drag_to(0.0, 0.0);
        // 向上拖很远
        c.drag_to(0.0, -100_000.0);
        let d = c.target - c.position;
        let r = (d.x * d.x + d.z * d.z).sqrt();
        let pitch = d.y.atan2(r);
        assert!(pitch <= PI / 2.5 + 1e-3);
        assert!(pitch > 1.0);
    }
}
