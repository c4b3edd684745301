//! # 手势状态机
//!
//! 维护模型矩阵（平移 + 缩放）。两种状态：
//!
//! - `Idle`：没有按住主键
//! - `Dragging`：主键按下，持有按下瞬间的模型矩阵与指针位置快照
//!
//! 拖拽时每次移动都从快照重新推导平移，而不是逐帧累加，
//! 因此一次拖拽里无论有多少移动事件，最终矩阵只取决于起点和当前点。

use crate::config::viewer::ZoomConfig;
use crate::core::matrix::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GestureSnapshot {
    model: Transform,
    pointer: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging(GestureSnapshot),
}

#[derive(Debug, Clone)]
pub struct ViewportState {
    model: Transform,
    /// 最近一次移动事件的指针位置（窗口像素，y 向下）
    pointer: [f32; 2],
    drag: DragState,
    zoom: ZoomConfig,
}

impl ViewportState {
    pub fn new(zoom: ZoomConfig) -> Self {
        Self {
            model: Transform::IDENTITY,
            pointer: [0.0, 0.0],
            drag: DragState::Idle,
            zoom,
        }
    }

    pub fn model(&self) -> &Transform {
        &self.model
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    /// 当前 x 方向缩放
    pub fn zoom(&self) -> f32 {
        self.model.scale_factors()[0]
    }

    /// 主键按下：进入 `Dragging` 并拍快照。重复按下会以当前状态重新拍快照。
    pub fn pointer_down(&mut self, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        self.drag = DragState::Dragging(GestureSnapshot {
            model: self.model,
            pointer: self.pointer,
        });
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        if button == PointerButton::Primary {
            self.drag = DragState::Idle;
        }
    }

    /// 记录指针位置；拖拽中则按快照重算平移。返回模型是否改变。
    ///
    /// `viewport` 为当前视口宽高，用于把像素差映射到 `-1..1` 裁剪空间。
    pub fn pointer_moved(&mut self, x: f32, y: f32, viewport: [f32; 2]) -> bool {
        self.pointer = [x, y];

        let DragState::Dragging(snapshot) = self.drag else {
            return false;
        };
        let [width, height] = viewport;
        if width <= 0.0 || height <= 0.0 {
            return false;
        }

        let dx = (x - snapshot.pointer[0]) / width * 2.0;
        let dy = (y - snapshot.pointer[1]) / height * 2.0;

        self.model = snapshot.model;
        // 屏幕 y 向下，裁剪空间 y 向上
        self.model.translate(dx, -dy, 0.0);
        true
    }

    /// 滚轮缩放，以模型原点为锚点。
    ///
    /// 结果缩放超出 `[min_scale, max_scale]` 时整次事件被拒绝（不夹到边界）。
    pub fn scroll(&mut self, delta_y: f32) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }

        let factor = 1.0 + self.zoom.step * delta_y;
        let next = self.zoom() * factor;
        if !(self.zoom.min_scale..=self.zoom.max_scale).contains(&next) {
            log::trace!("zoom rejected: {:.3} -> {next:.3}", self.zoom());
            return false;
        }

        self.model.scale(factor, factor, 1.0);
        true
    }

    /// 模型回到单位矩阵。拖拽中则以新模型重拍快照，手势从这里继续。
    pub fn reset(&mut self) {
        self.model.identity();
        if self.is_dragging() {
            self.drag = DragState::Dragging(GestureSnapshot {
                model: self.model,
                pointer: self.pointer,
            });
        }
    }
}
