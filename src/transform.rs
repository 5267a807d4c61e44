use cgmath::{
    Deg, InnerSpace, Matrix, Matrix4 as Mat4, Point3, SquareMatrix, Vector3 as Vec3,
    Vector4 as Vec4,
};

/// 4x4 齐次变换矩阵
///
/// 所有原地操作都是右乘（M = M * X），也就是在局部坐标系里继续变换。
/// 组合层级时先 clone 父节点的矩阵，再往后追加子节点自己的变换。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub mat: Mat4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Mat4<f32>> for Transform {
    fn from(mat: Mat4<f32>) -> Self {
        Self { mat }
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            mat: Mat4::identity(),
        }
    }

    pub fn from_matrix(mat: Mat4<f32>) -> Self {
        Self { mat }
    }

    pub fn set_identity(&mut self) -> &mut Self {
        self.mat = Mat4::identity();
        self
    }

    pub fn concat(&mut self, other: &Transform) -> &mut Self {
        self.mat = self.mat * other.mat;
        self
    }

    pub fn set_translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.mat = Mat4::from_translation(Vec3::new(x, y, z));
        self
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.mat = self.mat * Mat4::from_translation(Vec3::new(x, y, z));
        self
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.mat = Mat4::from_nonuniform_scale(x, y, z);
        self
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.mat = self.mat * Mat4::from_nonuniform_scale(x, y, z);
        self
    }

    /// 绕任意轴旋转，角度单位为度；零向量轴不做任何事
    pub fn set_rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) -> &mut Self {
        self.mat = rotation(angle, x, y, z);
        self
    }

    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) -> &mut Self {
        self.mat = self.mat * rotation(angle, x, y, z);
        self
    }

    pub fn set_look_at(&mut self, eye: Vec3<f32>, center: Vec3<f32>, up: Vec3<f32>) -> &mut Self {
        self.mat = Mat4::look_at_rh(
            Point3::new(eye.x, eye.y, eye.z),
            Point3::new(center.x, center.y, center.z),
            up,
        );
        self
    }

    pub fn look_at(&mut self, eye: Vec3<f32>, center: Vec3<f32>, up: Vec3<f32>) -> &mut Self {
        let view = *Transform::identity().set_look_at(eye, center, up);
        self.concat(&view)
    }

    /// GL 风格透视投影，NDC 的 z 落在 [-1, 1]
    pub fn set_perspective(
        &mut self,
        fovy_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.mat = cgmath::perspective(Deg(fovy_deg), aspect, near, far);
        self
    }

    pub fn perspective(&mut self, fovy_deg: f32, aspect: f32, near: f32, far: f32) -> &mut Self {
        self.mat = self.mat * cgmath::perspective(Deg(fovy_deg), aspect, near, far);
        self
    }

    pub fn set_frustum(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.mat = cgmath::frustum(left, right, bottom, top, near, far);
        self
    }

    pub fn set_ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.mat = cgmath::ortho(left, right, bottom, top, near, far);
        self
    }

    pub fn ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.mat = self.mat * cgmath::ortho(left, right, bottom, top, near, far);
        self
    }

    pub fn transpose(&mut self) -> &mut Self {
        self.mat = self.mat.transpose();
        self
    }

    /// 原地求逆；奇异矩阵返回 false 并保持原值
    pub fn invert(&mut self) -> bool {
        match self.mat.invert() {
            Some(inv) => {
                self.mat = inv;
                true
            }
            None => false,
        }
    }

    pub fn inverse(&self) -> Option<Transform> {
        self.mat.invert().map(Transform::from_matrix)
    }

    pub fn transform_point(&self, p: Vec3<f32>) -> Vec3<f32> {
        let v = self.mat * p.extend(1.0);
        if v.w.abs() > f32::EPSILON && (v.w - 1.0).abs() > f32::EPSILON {
            v.truncate() / v.w
        } else {
            v.truncate()
        }
    }

    pub fn transform_vector(&self, v: Vec4<f32>) -> Vec4<f32> {
        self.mat * v
    }

    /// 法线矩阵（逆转置）；厚度为 0 的地板这类奇异矩阵退化为单位矩阵
    pub fn normal_matrix(&self) -> Mat4<f32> {
        match self.mat.invert() {
            Some(inv) => inv.transpose(),
            None => Mat4::identity(),
        }
    }
}

fn rotation(angle: f32, x: f32, y: f32, z: f32) -> Mat4<f32> {
    let axis = Vec3::new(x, y, z);
    if axis.magnitude2() <= f32::EPSILON {
        return Mat4::identity();
    }
    Mat4::from_axis_angle(axis.normalize(), Deg(angle))
}

#[cfg(test)]
pub(crate) fn assert_mat_close(a: &Mat4<f32>, b: &Mat4<f32>, eps: f32) {
    let a: &[[f32; 4]; 4] = a.as_ref();
    let b: &[[f32; 4]; 4] = b.as_ref();
    for c in 0..4 {
        for r in 0..4 {
            assert!(
                (a[c][r] - b[c][r]).abs() <= eps,
                "element [{c}][{r}] differs: {} vs {}",
                a[c][r],
                b[c][r]
            );
        }
    }
}
