use super::turtle::TurtlePose;

pub const DEFAULT_NECK_ANGLE: f32 = 55.0;

/// 由经过时间驱动的动画参数
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub pose: TurtlePose,
    pub joints_running: [bool; 3],
    pub neck_animating: bool,
    /// 点光源在 x 轴上来回扫动
    pub light_x: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            pose: TurtlePose {
                neck: DEFAULT_NECK_ANGLE,
                ..TurtlePose::default()
            },
            joints_running: [false; 3],
            neck_animating: false,
            light_x: 0.0,
        }
    }
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 停下的关节保持当前角度
    pub fn update(&mut self, seconds: f32) {
        if self.joints_running[0] {
            self.pose.joint1 = (15.0 * seconds.sin()).abs();
        }
        if self.joints_running[1] {
            self.pose.joint2 = (10.0 * (seconds * 3.0).sin()).abs();
        }
        if self.joints_running[2] {
            self.pose.joint3 = (5.0 * (seconds * 3.0).sin()).abs();
        }
        if self.neck_animating {
            self.pose.neck = DEFAULT_NECK_ANGLE + 10.0 * (seconds * 2.0).sin();
        }
        self.light_x = 10.0 * (seconds / 4.0).sin();
    }

    /// 全部关节一起开关；只要有一个在动就全部停下
    pub fn toggle_joints(&mut self) {
        let run = !self.joints_running.iter().any(|&r| r);
        self.joints_running = [run; 3];
    }

    pub fn toggle_neck(&mut self) {
        self.neck_animating = !self.neck_animating;
    }
}
