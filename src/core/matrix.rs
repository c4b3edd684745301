//! # 4x4 仿射矩阵
//!
//! 列主序存储（与 `glUniformMatrix4fv(transpose = false)` 的内存布局一致）。
//!
//! 底层操作都是**累积**的：`scale` 乘到对角线上，`translate` 加到平移列上，
//! 都不会覆盖已有状态。需要从头构造时先 `identity()`，或者使用
//! `from_scale` / `set_translation` 这类绝对值辅助函数。
//!
//! 所有操作只触碰对角线和平移列，因此底行始终保持 `(0, 0, 0, 1)`。

/// 列主序仿射变换：`cols[c][r]` 为第 `c` 列第 `r` 行。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub cols: [[f32; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    // ── 底层：原地累积 ──────────────────────────────────────

    /// 重置为单位矩阵。
    pub fn identity(&mut self) {
        *self = Self::IDENTITY;
    }

    /// 在现有缩放上再乘以 `(sx, sy, sz)`。
    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.cols[0][0] *= sx;
        self.cols[1][1] *= sy;
        self.cols[2][2] *= sz;
    }

    /// 在现有平移上再加 `(tx, ty, tz)`。
    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) {
        self.cols[3][0] += tx;
        self.cols[3][1] += ty;
        self.cols[3][2] += tz;
    }

    // ── 上层：绝对值构造 ────────────────────────────────────

    pub fn from_scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.scale(sx, sy, sz);
        m
    }

    #[allow(dead_code)]
    pub fn from_translation(tx: f32, ty: f32, tz: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.translate(tx, ty, tz);
        m
    }

    /// 把缩放设为绝对值，保留平移。
    #[allow(dead_code)]
    pub fn set_scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.cols[0][0] = sx;
        self.cols[1][1] = sy;
        self.cols[2][2] = sz;
    }

    /// 把平移设为绝对值，保留缩放。
    #[allow(dead_code)]
    pub fn set_translation(&mut self, tx: f32, ty: f32, tz: f32) {
        self.cols[3][0] = tx;
        self.cols[3][1] = ty;
        self.cols[3][2] = tz;
    }

    // ── 读取 ────────────────────────────────────────────────

    /// 对角线上的 `(sx, sy, sz)`。
    pub fn scale_factors(&self) -> [f32; 3] {
        [self.cols[0][0], self.cols[1][1], self.cols[2][2]]
    }

    /// 平移列的 `(tx, ty, tz)`。
    #[allow(dead_code)]
    pub fn translation(&self) -> [f32; 3] {
        [self.cols[3][0], self.cols[3][1], self.cols[3][2]]
    }

    /// 展平成 16 个 `f32`，供 uniform 上传。
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (c, col) in self.cols.iter().enumerate() {
            out[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        out
    }
}
