//! # 视图会话
//!
//! 把手势状态机、宽高比投影和每帧上传策略组合在一起。
//! 宿主每帧按到达顺序喂入 [`ViewerEvent`]，排空后调用
//! [`ViewSession::end_frame`] 取得需要上传的矩阵。
//!
//! 所有修改都发生在 UI 线程上，不需要任何锁。

use crate::config::viewer::ZoomConfig;
use crate::core::matrix::Transform;
use crate::rendering::frame::FrameUpdates;
use crate::rendering::projection::{aspect_fit, viewport_aspect};
use crate::rendering::viewport::{PointerButton, ViewportState};

/// 宿主窗口事件，坐标为窗口像素（原点左上，y 向下）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    Quit,
    Resize { width: f32, height: f32 },
    /// 以“格”为单位的滚动量，正值放大
    Scroll { delta_y: f32 },
    PointerDown(PointerButton),
    PointerUp(PointerButton),
    PointerMoved { x: f32, y: f32 },
    ResetView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    Quit,
}

/// 一帧结束时需要上传的矩阵，未改变的为 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameUpload {
    pub model: Option<Transform>,
    pub proj: Option<Transform>,
}

#[derive(Debug, Clone)]
pub struct ViewSession {
    image_aspect: f32,
    viewport: [f32; 2],
    proj: Transform,
    viewport_state: ViewportState,
    updates: FrameUpdates,
}

impl ViewSession {
    pub fn new(image_aspect: f32, width: f32, height: f32, zoom: ZoomConfig) -> Self {
        let mut session = Self {
            image_aspect,
            viewport: [width, height],
            proj: Transform::IDENTITY,
            viewport_state: ViewportState::new(zoom),
            updates: FrameUpdates::default(),
        };
        session.recompute_proj();
        session
    }

    pub fn model(&self) -> &Transform {
        self.viewport_state.model()
    }

    pub fn proj(&self) -> &Transform {
        &self.proj
    }

    pub fn handle(&mut self, event: ViewerEvent) -> EventOutcome {
        match event {
            ViewerEvent::Quit => return EventOutcome::Quit,
            ViewerEvent::Resize { width, height } => self.resize(width, height),
            ViewerEvent::Scroll { delta_y } => {
                if self.viewport_state.scroll(delta_y) {
                    self.updates.mark_model();
                }
            }
            ViewerEvent::PointerDown(button) => self.viewport_state.pointer_down(button),
            ViewerEvent::PointerUp(button) => self.viewport_state.pointer_up(button),
            ViewerEvent::PointerMoved { x, y } => {
                if self.viewport_state.pointer_moved(x, y, self.viewport) {
                    self.updates.mark_model();
                }
            }
            ViewerEvent::ResetView => {
                self.viewport_state.reset();
                self.updates.mark_model();
            }
        }
        EventOutcome::Continue
    }

    /// 事件排空后调用一次：返回本帧改变过的矩阵并清空标记。
    pub fn end_frame(&mut self) -> FrameUpload {
        let signals = self.updates.take();
        FrameUpload {
            model: signals.model.then(|| *self.viewport_state.model()),
            proj: signals.proj.then_some(self.proj),
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        if viewport_aspect(width, height).is_none() {
            log::trace!("ignoring degenerate resize {width}x{height}");
            return;
        }
        self.viewport = [width, height];
        self.recompute_proj();
        self.updates.mark_proj();
    }

    fn recompute_proj(&mut self) {
        let [width, height] = self.viewport;
        if let Some(aspect) = viewport_aspect(width, height) {
            self.proj = aspect_fit(self.image_aspect, aspect);
            log::debug!("projection recomputed for viewport {width}x{height}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ViewSession {
        ViewSession::new(2.0, 500.0, 500.0, ZoomConfig::default())
    }

    #[test]
    fn first_frame_uploads_both_then_nothing() {
        let mut s = session();
        let first = s.end_frame();
        assert_eq!(first.model, Some(Transform::IDENTITY));
        assert_eq!(first.proj, Some(Transform::IDENTITY));
        assert_eq!(s.end_frame(), FrameUpload::default());
    }

    #[test]
    fn many_moves_upload_model_once() {
        let mut s = session();
        s.end_frame();
        s.handle(ViewerEvent::PointerDown(PointerButton::Primary));
        for x in 0..50 {
            s.handle(ViewerEvent::PointerMoved {
                x: x as f32,
                y: 0.0,
            });
        }
        let upload = s.end_frame();
        assert_eq!(upload.model, Some(*s.model()));
        assert_eq!(upload.proj, None);
    }

    #[test]
    fn resize_recomputes_projection_from_scratch() {
        let mut s = ViewSession::new(1.0, 300.0, 100.0, ZoomConfig::default());
        let wide = *s.proj();
        s.handle(ViewerEvent::Resize {
            width: 100.0,
            height: 400.0,
        });
        s.handle(ViewerEvent::Resize {
            width: 300.0,
            height: 100.0,
        });
        assert_eq!(*s.proj(), wide);
        assert_eq!(wide.scale_factors(), [1.0 / 3.0, 1.0, 1.0]);
    }

    #[test]
    fn resize_marks_projection_only() {
        let mut s = session();
        s.end_frame();
        s.handle(ViewerEvent::Resize {
            width: 800.0,
            height: 200.0,
        });
        let upload = s.end_frame();
        assert!(upload.proj.is_some());
        assert!(upload.model.is_none());
    }

    #[test]
    fn zero_height_resize_is_skipped() {
        let mut s = session();
        s.end_frame();
        let before = *s.proj();
        s.handle(ViewerEvent::Resize {
            width: 800.0,
            height: 0.0,
        });
        assert_eq!(*s.proj(), before);
        assert_eq!(s.end_frame(), FrameUpload::default());

        // 拖拽仍按旧的 500x500 视口归一化
        s.handle(ViewerEvent::PointerDown(PointerButton::Primary));
        s.handle(ViewerEvent::PointerMoved { x: 125.0, y: 0.0 });
        assert_eq!(s.model().translation()[0], 0.5);
    }

    #[test]
    fn drag_uses_the_resized_viewport() {
        let mut s = session();
        s.handle(ViewerEvent::Resize {
            width: 1000.0,
            height: 250.0,
        });
        s.handle(ViewerEvent::PointerDown(PointerButton::Primary));
        s.handle(ViewerEvent::PointerMoved { x: 250.0, y: 125.0 });
        assert_eq!(s.model().translation(), [0.5, -1.0, 0.0]);
    }

    #[test]
    fn scroll_after_release_never_restores_snapshot() {
        let mut s = session();
        s.handle(ViewerEvent::PointerDown(PointerButton::Primary));
        s.handle(ViewerEvent::PointerMoved { x: 125.0, y: 0.0 });
        s.handle(ViewerEvent::PointerUp(PointerButton::Primary));
        s.handle(ViewerEvent::Scroll { delta_y: -1.0 });

        assert_eq!(s.model().translation()[0], 0.5);
        assert!((s.model().scale_factors()[0] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn rejected_scroll_does_not_mark_model() {
        let mut s = session();
        s.end_frame();
        s.handle(ViewerEvent::Scroll { delta_y: -20.0 });
        assert_eq!(s.end_frame(), FrameUpload::default());
    }

    #[test]
    fn reset_restores_identity_model() {
        let mut s = session();
        s.handle(ViewerEvent::Scroll { delta_y: 2.0 });
        s.end_frame();
        s.handle(ViewerEvent::ResetView);
        assert_eq!(s.end_frame().model, Some(Transform::IDENTITY));
    }

    #[test]
    fn quit_is_reported() {
        let mut s = session();
        assert_eq!(s.handle(ViewerEvent::Quit), EventOutcome::Quit);
        assert_eq!(
            s.handle(ViewerEvent::Scroll { delta_y: 1.0 }),
            EventOutcome::Continue
        );
    }
}
