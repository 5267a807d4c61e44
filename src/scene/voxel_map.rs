use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SceneError};
use crate::shape::Shape;
use crate::transform::Transform;

pub const MAP_WIDTH: usize = 32;
pub const MAP_DEPTH: usize = 32;
pub const MAP_HEIGHT: usize = 4;
/// 方块边长（世界单位）
pub const BLOCK_SIZE: f32 = 0.5;

const BLOCK_COLOR: [f32; 3] = [0.55, 0.4, 0.25];
const PILLAR_COUNT: usize = 24;

/// 网格坐标；x、z ∈ [0, 32)，y ∈ [0, 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    fn index(&self) -> Option<usize> {
        let in_range = |v: i32, n: usize| v >= 0 && (v as usize) < n;
        if !(in_range(self.x, MAP_WIDTH)
            && in_range(self.z, MAP_DEPTH)
            && in_range(self.y, MAP_HEIGHT))
        {
            return None;
        }
        // blocks[x][z][y]
        Some((self.x as usize * MAP_DEPTH + self.z as usize) * MAP_HEIGHT + self.y as usize)
    }

    fn checked_index(&self) -> Result<usize> {
        self.index().ok_or(SceneError::BlockOutOfRange {
            x: self.x,
            y: self.y,
            z: self.z,
        })
    }

    /// 以地图中心为原点、每格 0.5 的模型矩阵
    pub fn block_matrix(&self) -> Transform {
        let mut m = Transform::identity();
        m.scale(BLOCK_SIZE, BLOCK_SIZE, BLOCK_SIZE).translate(
            (self.x - MAP_WIDTH as i32 / 2) as f32,
            (self.y - 1) as f32,
            (self.z - MAP_DEPTH as i32 / 2) as f32,
        );
        m
    }
}

/// 32×32×4 的方块网格，每格存放一个模型矩阵或为空
#[derive(Debug, Clone)]
pub struct VoxelMap {
    blocks: Vec<Option<Transform>>,
}

impl Default for VoxelMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl VoxelMap {
    pub fn empty() -> Self {
        Self {
            blocks: vec![None; MAP_WIDTH * MAP_DEPTH * MAP_HEIGHT],
        }
    }

    /// 固定种子生成：一圈围墙 + 随机石柱
    pub fn generate(seed: u64) -> Self {
        let mut map = Self::empty();
        let mut rng = StdRng::seed_from_u64(seed);

        let last_x = MAP_WIDTH as i32 - 1;
        let last_z = MAP_DEPTH as i32 - 1;
        for x in 0..MAP_WIDTH as i32 {
            for z in 0..MAP_DEPTH as i32 {
                if x == 0 || z == 0 || x == last_x || z == last_z {
                    let height = rng.random_range(1..=2);
                    for y in 0..height {
                        map.set(BlockPos::new(x, y, z), true);
                    }
                }
            }
        }

        for _ in 0..PILLAR_COUNT {
            let x = rng.random_range(2..last_x - 1);
            let z = rng.random_range(2..last_z - 1);
            // 中间留给乌龟和球
            if (x - 16).abs() < 4 && (z - 16).abs() < 4 {
                continue;
            }
            let height = rng.random_range(1..=MAP_HEIGHT as i32);
            for y in 0..height {
                map.set(BlockPos::new(x, y, z), true);
            }
        }
        log::debug!("生成地图 seed={seed}，共 {} 个方块", map.len());
        map
    }

    fn set(&mut self, pos: BlockPos, filled: bool) {
        if let Some(i) = pos.index() {
            self.blocks[i] = filled.then(|| pos.block_matrix());
        }
    }

    pub fn place_block(&mut self, pos: BlockPos) -> Result<()> {
        let i = pos.checked_index()?;
        self.blocks[i] = Some(pos.block_matrix());
        Ok(())
    }

    /// 返回原来是否有方块
    pub fn remove_block(&mut self, pos: BlockPos) -> Result<bool> {
        let i = pos.checked_index()?;
        Ok(self.blocks[i].take().is_some())
    }

    pub fn block(&self, pos: BlockPos) -> Result<Option<&Transform>> {
        let i = pos.checked_index()?;
        Ok(self.blocks[i].as_ref())
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Option::is_none)
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.blocks
            .iter()
            .flatten()
            .map(|m| {
                Shape::cube()
                    .with_color(BLOCK_COLOR[0], BLOCK_COLOR[1], BLOCK_COLOR[2])
                    .with_matrix(*m)
            })
            .collect()
    }
}
