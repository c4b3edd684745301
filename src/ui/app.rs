use std::sync::{Arc, Mutex};

use eframe::egui;
use egui::{Color32, Sense, Vec2};

use crate::config::viewer::ViewerConfig;
use crate::core::image::DecodedImage;
use crate::core::ViewerError;
use crate::rendering::gl_quad::{make_quad_callback, GlQuad};
use crate::rendering::view::{EventOutcome, ViewSession, ViewerEvent};
use crate::ui::input::translate_events;

/// 应用回调里出现的致命错误，`run_native` 返回后由 main 取出。
pub type FailureSlot = Arc<Mutex<Option<ViewerError>>>;

pub struct ViewerApp {
    session: ViewSession,
    /// GL 初始化失败时为 None，首帧即关闭窗口
    quad: Option<Arc<Mutex<GlQuad>>>,
    background: Color32,
    points_per_step: f32,
    /// 上一帧画布尺寸，变化即视为 resize
    canvas_size: Option<Vec2>,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        image: DecodedImage,
        config: &ViewerConfig,
        failure: FailureSlot,
    ) -> Self {
        let session = ViewSession::new(
            image.aspect(),
            config.window.width,
            config.window.height,
            config.zoom,
        );

        let quad = match cc.gl.as_deref() {
            Some(gl) => GlQuad::new(gl, &image, config.filter),
            None => Err("eframe did not provide a glow context".to_string()),
        };
        // 像素已经上传到显存，CPU 端副本随 `image` 一起释放
        drop(image);

        let quad = match quad {
            Ok(quad) => Some(Arc::new(Mutex::new(quad))),
            Err(message) => {
                log::error!("{message}");
                if let Ok(mut slot) = failure.lock() {
                    *slot = Some(ViewerError::Graphics(message));
                }
                None
            }
        };

        let [r, g, b] = config.background;
        Self {
            session,
            quad,
            background: Color32::from_rgb(r, g, b),
            points_per_step: config.zoom.points_per_step,
            canvas_size: None,
        }
    }

    /// 按到达顺序处理本帧事件。返回 false 表示收到退出请求。
    fn drain_events(&mut self, events: Vec<ViewerEvent>) -> bool {
        for event in events {
            if self.session.handle(event) == EventOutcome::Quit {
                return false;
            }
        }
        true
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(quad) = self.quad.clone() else {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        };

        let points_per_step = self.points_per_step;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.background))
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

                let mut events = Vec::new();
                if self.canvas_size != Some(rect.size()) {
                    self.canvas_size = Some(rect.size());
                    events.push(ViewerEvent::Resize {
                        width: rect.width(),
                        height: rect.height(),
                    });
                }
                events.extend(ctx.input(|i| translate_events(&i.events, rect.min, points_per_step)));
                if response.double_clicked() {
                    events.push(ViewerEvent::ResetView);
                }

                if !self.drain_events(events) {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }

                let upload = self.session.end_frame();
                match quad.lock() {
                    Ok(mut quad) => quad.queue(upload),
                    Err(_) => log::error!("GL quad state poisoned"),
                }
                ui.painter().add(make_quad_callback(quad, rect));
            });
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        let (Some(gl), Some(quad)) = (gl, self.quad.take()) else {
            return;
        };
        if let Ok(mut quad) = quad.lock() {
            quad.destroy(gl);
        }
    }
}
