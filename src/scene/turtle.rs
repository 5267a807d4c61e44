use cgmath::Vector3 as Vec3;

use crate::shape::Shape;
use crate::transform::Transform;

const SHELL_GREEN: [f32; 3] = [0.1, 0.6, 0.1];
const BELLY_GREY: [f32; 3] = [0.7, 0.7, 0.7];
const SKIN: [f32; 3] = [0.6, 0.7, 0.6];
const EYE_WHITE: [f32; 3] = [0.9, 0.9, 0.9];
const PUPIL: [f32; 3] = [0.1, 0.1, 0.1];
const SHELL_RINGS: usize = 6;

/// 关节角（度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtlePose {
    pub neck: f32,
    pub joint1: f32,
    pub joint2: f32,
    pub joint3: f32,
}

impl Default for TurtlePose {
    fn default() -> Self {
        Self {
            neck: 55.0,
            joint1: 0.0,
            joint2: 0.0,
            joint3: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Turtle {
    pub position: Vec3<f32>,
}

fn cube(color: [f32; 3], matrix: Transform) -> Shape {
    Shape::cube()
        .with_color(color[0], color[1], color[2])
        .with_matrix(matrix)
}

impl Turtle {
    pub fn new(position: Vec3<f32>) -> Self {
        Self { position }
    }

    /// 每次调用都从头重建整个层级
    pub fn shapes(&self, pose: &TurtlePose) -> Vec<Shape> {
        let p = self.position;
        let mut out = Vec::with_capacity(24);
        // 四肢和脖子挂在未平移的身体坐标系上
        let root = Transform::identity();

        // 身体
        let mut body = root;
        body.translate(-0.3 + p.x, -0.2 + p.y, p.z).scale(1.0, 0.15, 0.8);
        out.push(cube(SHELL_GREEN, body));

        // 龟壳：每一层都相对上一层
        let mut shell = body;
        shell.translate(0.1, 0.5, 0.1).scale(0.8, 0.8, 0.8);
        out.push(cube(SHELL_GREEN, shell));
        for i in 0..SHELL_RINGS {
            let size_mod = i as f32 * 0.05;
            let s = 0.8 - size_mod;
            shell
                .translate(0.1 + size_mod / 2.0, 0.5, 0.1 + size_mod / 2.0)
                .scale(s, s, s);
            out.push(cube(SHELL_GREEN, shell));
        }

        // 腹甲
        let mut belly = body;
        belly.translate(0.05, -0.3, 0.05).scale(0.9, 0.3, 0.9);
        out.push(cube(BELLY_GREY, belly));
        let mut belly = body;
        belly.translate(0.075, -0.5, 0.1).scale(0.85, 0.3, 0.8);
        out.push(cube(BELLY_GREY, belly));

        // 脖子 -> 头 -> 眼睛 -> 瞳孔
        let mut neck_frame = root;
        neck_frame
            .translate(-0.23 + p.x, -0.27 + p.y, 0.3 + p.z)
            .rotate(pose.neck, 0.0, 0.0, 1.0);
        let mut neck = neck_frame;
        neck.scale(0.08, 0.3, 0.19);
        out.push(cube(SKIN, neck));

        let mut head_frame = neck_frame;
        head_frame
            .translate(-0.1, 0.35, -0.005)
            .rotate(-pose.neck, 0.0, 0.0, 1.0);
        let mut head = head_frame;
        head.scale(0.2, 0.2, 0.2);
        out.push(cube(SKIN, head));

        for (eye_z, pupil_z) in [(-0.01, -0.015), (0.18, 0.025)] {
            let mut eye_frame = head_frame;
            eye_frame.translate(0.06, 0.1, eye_z);
            let mut eye = eye_frame;
            eye.scale(0.05, 0.05, 0.03);
            out.push(cube(EYE_WHITE, eye));

            let mut pupil = eye_frame;
            pupil.translate(0.005, 0.01, pupil_z).scale(0.025, 0.025, 0.02);
            out.push(cube(PUPIL, pupil));
        }

        // 左前肢：肩 -> 前臂 -> 手
        let mut arm = root;
        arm.rotate(70.0 - pose.joint1, 0.0, 1.0, 0.0)
            .translate(-0.1 + p.x, -0.25 + p.y, -0.1 + p.z);
        let mut forearm = arm;
        forearm
            .translate(0.25, 0.0, 0.0)
            .rotate(-20.0 - pose.joint2, 0.0, 1.0, 0.0);
        let mut hand = forearm;
        hand.translate(0.2, 0.0, 0.0)
            .rotate(-20.0 - pose.joint3, 0.0, 1.0, 0.0)
            .scale(0.1, 0.1, 0.15);
        arm.scale(0.25, 0.1, 0.15);
        forearm.scale(0.2, 0.1, 0.15);
        out.extend([arm, forearm, hand].map(|m| cube(SKIN, m)));

        // 右前肢，与左边镜像
        let mut arm = root;
        arm.translate(p.x, -0.25 + p.y, 0.65 + p.z)
            .rotate(-70.0 + pose.joint1, 0.0, 1.0, 0.0);
        let mut forearm = arm;
        forearm
            .translate(0.175, 0.0, 0.014)
            .rotate(20.0 + pose.joint2, 0.0, 1.0, 0.0);
        let mut hand = forearm;
        hand.translate(0.135, 0.0, 0.013)
            .rotate(20.0 + pose.joint3, 0.0, 1.0, 0.0)
            .scale(0.1, 0.1, 0.15);
        arm.scale(0.25, 0.1, 0.15);
        forearm.scale(0.2, 0.1, 0.15);
        out.extend([arm, forearm, hand].map(|m| cube(SKIN, m)));

        // 后腿只跟随 joint2
        for (x, z, angle) in [(0.4, 0.65, -50.0 + pose.joint2), (0.3, 0.05, 50.0 - pose.joint2)] {
            let mut leg = root;
            leg.translate(x + p.x, -0.25 + p.y, z + p.z)
                .rotate(angle, 0.0, 1.0, 0.0)
                .scale(0.25, 0.1, 0.15);
            out.push(cube(SKIN, leg));
        }

        out
    }
}
