//! 把 egui 原始输入事件翻译成 [`ViewerEvent`]，保持到达顺序。

use egui::{Event, Key, Pos2};

use crate::rendering::view::ViewerEvent;
use crate::rendering::viewport::PointerButton;

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// 坐标换算到画布左上角为原点；滚动量除以 `points_per_step` 换成“格”。
pub fn translate_events(
    events: &[Event],
    canvas_origin: Pos2,
    points_per_step: f32,
) -> Vec<ViewerEvent> {
    let mut out = Vec::with_capacity(events.len());
    let local = |pos: Pos2| {
        let p = pos - canvas_origin;
        ViewerEvent::PointerMoved { x: p.x, y: p.y }
    };

    for event in events {
        match event {
            Event::PointerMoved(pos) => out.push(local(*pos)),
            Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                let Some(button) = map_button(*button) else {
                    continue;
                };
                // 先同步位置，快照才能拿到按下瞬间的指针
                out.push(local(*pos));
                out.push(if *pressed {
                    ViewerEvent::PointerDown(button)
                } else {
                    ViewerEvent::PointerUp(button)
                });
            }
            Event::Scroll(delta) if delta.y != 0.0 && points_per_step > 0.0 => {
                out.push(ViewerEvent::Scroll {
                    delta_y: delta.y / points_per_step,
                });
            }
            Event::Key {
                key: Key::Escape,
                pressed: true,
                ..
            } => out.push(ViewerEvent::Quit),
            Event::Key {
                key: Key::R,
                pressed: true,
                repeat: false,
                ..
            } => out.push(ViewerEvent::ResetView),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use egui::{vec2, Modifiers};

    use super::*;

    const ORIGIN: Pos2 = Pos2::new(10.0, 20.0);

    #[test]
    fn pointer_positions_are_canvas_relative() {
        let events = [Event::PointerMoved(Pos2::new(110.0, 70.0))];
        assert_eq!(
            translate_events(&events, ORIGIN, 50.0),
            vec![ViewerEvent::PointerMoved { x: 100.0, y: 50.0 }]
        );
    }

    #[test]
    fn button_press_syncs_position_first() {
        let events = [
            Event::PointerButton {
                pos: Pos2::new(30.0, 40.0),
                button: egui::PointerButton::Primary,
                pressed: true,
                modifiers: Modifiers::NONE,
            },
            Event::PointerButton {
                pos: Pos2::new(30.0, 40.0),
                button: egui::PointerButton::Primary,
                pressed: false,
                modifiers: Modifiers::NONE,
            },
        ];
        assert_eq!(
            translate_events(&events, ORIGIN, 50.0),
            vec![
                ViewerEvent::PointerMoved { x: 20.0, y: 20.0 },
                ViewerEvent::PointerDown(PointerButton::Primary),
                ViewerEvent::PointerMoved { x: 20.0, y: 20.0 },
                ViewerEvent::PointerUp(PointerButton::Primary),
            ]
        );
    }

    #[test]
    fn extra_buttons_are_ignored() {
        let events = [Event::PointerButton {
            pos: Pos2::ZERO,
            button: egui::PointerButton::Extra1,
            pressed: true,
            modifiers: Modifiers::NONE,
        }];
        assert!(translate_events(&events, ORIGIN, 50.0).is_empty());
    }

    #[test]
    fn scroll_is_converted_to_steps() {
        let events = [
            Event::Scroll(vec2(0.0, 50.0)),
            Event::Scroll(vec2(0.0, -25.0)),
            Event::Scroll(vec2(40.0, 0.0)),
        ];
        assert_eq!(
            translate_events(&events, ORIGIN, 50.0),
            vec![
                ViewerEvent::Scroll { delta_y: 1.0 },
                ViewerEvent::Scroll { delta_y: -0.5 },
            ]
        );
    }
}
