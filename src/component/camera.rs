//! Camera 组件
//!
//! 左手坐标系的第一人称相机：视图矩阵由 right/up/look 基向量手动构建，
//! 投影把深度映射到 [0, 1]。键盘 WASD 移动，按住鼠标右键拖动转向。

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::Unit;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::core::input::InputState;
use crate::core::scene::CameraConfig;
use crate::core::timer::FrameTimer;
use crate::math::utils::deg_to_rad;
use crate::math::{matrix, Matrix4, Vector3};
use crate::renderer::collaborators::CameraController;

/// 相机
pub struct Camera {
    input: Rc<RefCell<InputState>>,

    position: Vector3,

    /// 相机坐标系：右向量
    right: Vector3,
    /// 相机坐标系：上向量
    up: Vector3,
    /// 相机坐标系：前向量（Look）
    look: Vector3,

    near_z: f32,
    far_z: f32,
    aspect: f32,
    /// 垂直视场角（弧度）
    fov_y: f32,

    /// 移动速度（单位/秒）
    move_speed: f32,
    /// 鼠标灵敏度（度/像素）
    mouse_sensitivity: f32,

    view_matrix: Matrix4,
    proj_matrix: Matrix4,
}

impl Camera {
    pub fn new(input: Rc<RefCell<InputState>>, config: &CameraConfig) -> Self {
        let mut camera = Self {
            input,
            position: Vector3::from(config.position),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            look: Vector3::new(0.0, 0.0, 1.0),
            near_z: config.near_clip,
            far_z: config.far_clip,
            aspect: 1.0,
            fov_y: deg_to_rad(config.fov),
            move_speed: config.move_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            view_matrix: Matrix4::identity(),
            proj_matrix: Matrix4::identity(),
        };
        camera.set_lens(camera.fov_y, camera.aspect, camera.near_z, camera.far_z);
        camera.update_view_matrix();
        camera
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn look(&self) -> Vector3 {
        self.look
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// 垂直 FOV（弧度）
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// 设置透视投影参数
    pub fn set_lens(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near_z = near_z;
        self.far_z = far_z;
        self.proj_matrix = matrix::perspective_lh(fov_y, aspect, near_z, far_z);
    }

    /// 设置相机朝向目标点
    pub fn look_at(&mut self, position: Vector3, target: Vector3, world_up: Vector3) {
        let look = (target - position).normalize();
        let right = world_up.cross(&look).normalize();
        let up = look.cross(&right);

        self.position = position;
        self.look = look;
        self.right = right;
        self.up = up;
        self.update_view_matrix();
    }

    /// 左右平移（正值向右）
    pub fn strafe(&mut self, distance: f32) {
        self.position += self.right * distance;
    }

    /// 前后移动（正值向前）
    pub fn walk(&mut self, distance: f32) {
        self.position += self.look * distance;
    }

    /// 俯仰：绕 Right 轴旋转 Up 和 Look
    pub fn pitch(&mut self, angle: f32) {
        let axis = Unit::new_normalize(self.right);
        let rotation = Matrix4::from_axis_angle(&axis, angle);

        self.up = rotation.transform_vector(&self.up).normalize();
        self.look = rotation.transform_vector(&self.look).normalize();
    }

    /// 偏航：绕世界 Y 轴旋转所有基向量
    pub fn rotate_y(&mut self, angle: f32) {
        let rotation = Matrix4::from_axis_angle(&Vector3::y_axis(), angle);

        self.right = rotation.transform_vector(&self.right).normalize();
        self.up = rotation.transform_vector(&self.up).normalize();
        self.look = rotation.transform_vector(&self.look).normalize();
    }

    /// 重新正交化基向量并重建视图矩阵
    pub fn update_view_matrix(&mut self) {
        let look = self.look.normalize();
        let up = look.cross(&self.right).normalize();
        let right = up.cross(&look);

        let x = -self.position.dot(&right);
        let y = -self.position.dot(&up);
        let z = -self.position.dot(&look);

        self.right = right;
        self.up = up;
        self.look = look;

        #[rustfmt::skip]
        let view = Matrix4::new(
            right.x, right.y, right.z, x,
            up.x,    up.y,    up.z,    y,
            look.x,  look.y,  look.z,  z,
            0.0,     0.0,     0.0,     1.0,
        );
        self.view_matrix = view;
    }
}

impl CameraController for Camera {
    fn initialize(&mut self, aspect: f32, fov_deg: f32, position: Vector3) {
        self.set_lens(deg_to_rad(fov_deg), aspect, self.near_z, self.far_z);
        // 从初始位置看向原点
        let target = if position.norm() > f32::EPSILON {
            Vector3::zeros()
        } else {
            position + Vector3::z()
        };
        self.look_at(position, target, Vector3::y());
    }

    fn update(&mut self, timer: &dyn FrameTimer) {
        let dt = timer.elapsed();
        let distance = self.move_speed * dt;

        let (forward, right, delta) = {
            let mut input = self.input.borrow_mut();
            let axis = |positive: KeyCode, negative: KeyCode| -> f32 {
                (input.is_key_pressed(positive) as i32 - input.is_key_pressed(negative) as i32) as f32
            };
            let forward = axis(KeyCode::KeyW, KeyCode::KeyS);
            let right = axis(KeyCode::KeyD, KeyCode::KeyA);
            let delta = if input.is_mouse_button_pressed(MouseButton::Right) {
                input.take_mouse_delta()
            } else {
                input.take_mouse_delta();
                (0.0, 0.0)
            };
            (forward, right, delta)
        };

        self.walk(forward * distance);
        self.strafe(right * distance);

        let (dx, dy) = delta;
        if dx != 0.0 || dy != 0.0 {
            self.pitch(deg_to_rad(dy * self.mouse_sensitivity));
            self.rotate_y(deg_to_rad(dx * self.mouse_sensitivity));
        }

        self.update_view_matrix();
    }

    fn view_matrix(&self) -> Matrix4 {
        self.view_matrix
    }

    fn projection_matrix(&self) -> Matrix4 {
        self.proj_matrix
    }
}
