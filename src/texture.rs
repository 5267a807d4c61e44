use std::path::Path;

use cgmath::{Vector2 as Vec2, Vector4 as Vec4};
use image::RgbaImage;

use crate::error::Result;

/// RGBA 纹理，每个像素打包成 0xRRGGBBAA
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0xFFFFFFFF; width * height],
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        log::debug!("读取纹理 {} ({}x{})", path.display(), img.width(), img.height());
        Ok(Self::from_rgba_image(&img))
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x, y);
                data.push(pack_rgba(pixel[0], pixel[1], pixel[2], pixel[3]));
            }
        }
        Texture {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    /// 棋盘格纹理，找不到图片时用来顶替
    pub fn checker(size: usize, cells: usize, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut data = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let c = if (x / cell + y / cell) % 2 == 0 { a } else { b };
                data.push(pack_rgba(c[0], c[1], c[2], c[3]));
            }
        }
        Self {
            width: size,
            height: size,
            data,
        }
    }

    /// 读取图片；失败时记录警告并退回棋盘格
    pub fn load_or_checker(path: Option<&Path>, a: [u8; 4], b: [u8; 4]) -> Self {
        match path {
            Some(path) => match Self::from_file(path) {
                Ok(tex) => tex,
                Err(err) => {
                    log::warn!("无法读取纹理 {}: {err}，改用棋盘格", path.display());
                    Self::checker(64, 8, a, b)
                }
            },
            None => Self::checker(64, 8, a, b),
        }
    }

    /// 最近邻采样，REPEAT 环绕；翻转 V 轴使 uv(0,0) 对应左下角
    pub fn sample(&self, uv: Vec2<f32>) -> Vec4<f32> {
        if self.width == 0 || self.height == 0 {
            return Vec4::new(1.0, 1.0, 1.0, 1.0);
        }
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();

        let x = ((u * self.width as f32) as usize).min(self.width - 1);
        let y = (((1.0 - v) * self.height as f32) as usize).min(self.height - 1);

        self.get_pixel_color(x, y)
    }

    fn get_pixel_color(&self, x: usize, y: usize) -> Vec4<f32> {
        let color = self.data[y * self.width + x];
        Vec4::new(
            ((color >> 24) & 0xFF) as f32 / 255.0,
            ((color >> 16) & 0xFF) as f32 / 255.0,
            ((color >> 8) & 0xFF) as f32 / 255.0,
            (color & 0xFF) as f32 / 255.0,
        )
    }
}

fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
}
