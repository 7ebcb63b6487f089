// The window the operator sees: video viewport, EXIT / SHUTDOWN buttons and
// the shutdown confirmation dialog. The rest of the crate only sees the
// `DisplaySurface` trait.

use display_info::DisplayInfo;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::draw::{self, Canvas};
use crate::error::Error;
use crate::layout::{DisplayMode, Layout};
use crate::types::{Rect, Resolution};

const CONFIRM_PROMPT: &str = "SHUT DOWN DEVICE?";

/// Raw operator input, decoded to what was clicked or pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    WindowClosed,
    ExitPressed,
    ShutdownPressed,
    ConfirmPressed,
    CancelPressed,
}

/// Sink for presented frames and source of operator input.
pub trait DisplaySurface {
    /// Show a `width x height` image with its top-left at the offset inside the viewport.
    fn present(
        &mut self,
        pixels: &[u32],
        width: usize,
        height: usize,
        offset_x: usize,
        offset_y: usize,
    ) -> Result<(), Error>;

    /// Pump the window and return input since the last call.
    fn poll_events(&mut self) -> Vec<UiEvent>;

    /// Show or hide the modal confirmation dialog.
    fn set_confirm_visible(&mut self, visible: bool);

    /// Destroy the window. Idempotent.
    fn close(&mut self);
}

/// Size of the primary monitor, queried once at startup.
/// `None` if no display could be enumerated.
pub fn primary_screen() -> Option<Resolution> {
    let displays = match DisplayInfo::all() {
        Ok(displays) => displays,
        Err(e) => {
            log::warn!("cannot query displays: {e}");
            return None;
        }
    };
    let sizes: Vec<(bool, Resolution)> = displays
        .iter()
        .map(|d| (d.is_primary, Resolution::new(d.width, d.height)))
        .collect();
    let screen = pick_primary(&sizes);
    if let Some(screen) = screen {
        log::debug!("primary screen is {screen} ({} display(s))", sizes.len());
    }
    screen
}

/// The primary display, else the first one. Zero-sized entries are skipped.
fn pick_primary(displays: &[(bool, Resolution)]) -> Option<Resolution> {
    let usable = || {
        displays
            .iter()
            .filter(|(_, r)| r.width > 0 && r.height > 0)
    };
    usable()
        .find(|(primary, _)| *primary)
        .or_else(|| usable().next())
        .map(|(_, r)| *r)
}

/// What a click at (x,y) means. While the dialog is up, only its buttons count.
pub fn hit_test(layout: &Layout, confirm_visible: bool, x: u32, y: u32) -> Option<UiEvent> {
    let targets: [(Rect, UiEvent); 2] = if confirm_visible {
        [
            (layout.confirm_button, UiEvent::ConfirmPressed),
            (layout.cancel_button, UiEvent::CancelPressed),
        ]
    } else {
        [
            (layout.exit_button, UiEvent::ExitPressed),
            (layout.shutdown_button, UiEvent::ShutdownPressed),
        ]
    };
    targets
        .into_iter()
        .find(|(rect, _)| rect.contains(x, y))
        .map(|(_, event)| event)
}

/// Draw the button strip below the viewport.
fn draw_controls(canvas: &mut Canvas, layout: &Layout) {
    draw::draw_button(canvas, layout.exit_button, "EXIT");
    draw::draw_button(canvas, layout.shutdown_button, "SHUTDOWN");
}

/// Draw the modal dialog on top of whatever is on the canvas.
fn draw_dialog(canvas: &mut Canvas, layout: &Layout) {
    let d = layout.dialog;
    canvas.fill_rect(Rect::new(d.x + 4, d.y + 4, d.width, d.height), draw::DIALOG_SHADE);
    canvas.fill_rect(d, draw::DIALOG_FACE);
    canvas.stroke_rect(d, draw::BUTTON_BORDER);

    let prompt_area = Rect::new(d.x, d.y, d.width, d.height / 2);
    draw::draw_text_centered(canvas, prompt_area, CONFIRM_PROMPT, 2, draw::TEXT);
    draw::draw_button(canvas, layout.confirm_button, "YES");
    draw::draw_button(canvas, layout.cancel_button, "NO");
}

/// minifb-backed surface.
pub struct MinifbSurface {
    window: Option<Window>,
    layout: Layout,
    canvas: Canvas,
    confirm_visible: bool,
    mouse_was_down: bool,
    dirty: bool,
}

impl MinifbSurface {
    /// Open the window described by `layout`.
    pub fn open(title: &str, layout: Layout) -> Result<Self, Error> {
        let fullscreen = layout.mode == DisplayMode::Fullscreen;
        let options = WindowOptions {
            borderless: fullscreen,
            topmost: fullscreen,
            resize: false,
            ..WindowOptions::default()
        };

        let (w, h) = (layout.window.width as usize, layout.window.height as usize);
        let mut window =
            Window::new(title, w, h, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        if fullscreen {
            window.set_position(0, 0);
        }
        log::debug!("window '{title}' opened at {w}x{h} ({:?})", layout.mode);

        let mut canvas = Canvas::new(w, h, draw::BACKGROUND);
        draw_controls(&mut canvas, &layout);

        Ok(Self {
            window: Some(window),
            layout,
            canvas,
            confirm_visible: false,
            mouse_was_down: false,
            dirty: true,
        })
    }

    fn push(&mut self) -> Result<(), Error> {
        let Some(window) = self.window.as_mut() else {
            return Ok(());
        };
        window
            .update_with_buffer(&self.canvas.pixels, self.canvas.width, self.canvas.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        self.dirty = false;
        Ok(())
    }

    fn redraw_chrome(&mut self) {
        draw_controls(&mut self.canvas, &self.layout);
        if self.confirm_visible {
            draw_dialog(&mut self.canvas, &self.layout);
        }
        self.dirty = true;
    }
}

impl DisplaySurface for MinifbSurface {
    fn present(
        &mut self,
        pixels: &[u32],
        width: usize,
        height: usize,
        offset_x: usize,
        offset_y: usize,
    ) -> Result<(), Error> {
        let vp = self.layout.viewport;
        // Letterbox bars keep the background color.
        self.canvas
            .fill_rect(Rect::new(0, 0, vp.width, vp.height), draw::BACKGROUND);
        self.canvas.blit(pixels, width, height, offset_x, offset_y);
        if self.confirm_visible {
            draw_dialog(&mut self.canvas, &self.layout);
        }
        self.push()
    }

    fn poll_events(&mut self) -> Vec<UiEvent> {
        if self.dirty {
            if let Err(e) = self.push() {
                log::warn!("{e}");
            }
        } else if let Some(window) = self.window.as_mut() {
            window.update();
        }

        let Some(window) = self.window.as_ref() else {
            return Vec::new();
        };
        if !window.is_open() {
            return vec![UiEvent::WindowClosed];
        }

        let mut events = Vec::new();

        // A click is the press edge of the left button.
        let down = window.get_mouse_down(MouseButton::Left);
        if down && !self.mouse_was_down {
            if let Some((x, y)) = window.get_mouse_pos(MouseMode::Discard) {
                let hit = hit_test(
                    &self.layout,
                    self.confirm_visible,
                    x.max(0.0) as u32,
                    y.max(0.0) as u32,
                );
                events.extend(hit);
            }
        }
        self.mouse_was_down = down;

        if self.confirm_visible {
            if window.is_key_pressed(Key::Y, KeyRepeat::No)
                || window.is_key_pressed(Key::Enter, KeyRepeat::No)
            {
                events.push(UiEvent::ConfirmPressed);
            }
            if window.is_key_pressed(Key::N, KeyRepeat::No)
                || window.is_key_pressed(Key::Escape, KeyRepeat::No)
            {
                events.push(UiEvent::CancelPressed);
            }
        }

        events
    }

    fn set_confirm_visible(&mut self, visible: bool) {
        if self.confirm_visible == visible {
            return;
        }
        self.confirm_visible = visible;
        if !visible {
            // Wipe the dialog; the next frame repaints the viewport.
            let d = self.layout.dialog;
            self.canvas
                .fill_rect(Rect::new(d.x, d.y, d.width + 4, d.height + 4), draw::BACKGROUND);
        }
        self.redraw_chrome();
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            log::info!("window destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutParams;
    use crate::types::Resolution;

    fn layout() -> Layout {
        Layout::compute(&LayoutParams {
            screen: Resolution::new(1920, 1080),
            mode: DisplayMode::Windowed,
            zoom: 1.0,
            max_height_fraction: 0.7,
        })
    }

    fn center(r: Rect) -> (u32, u32) {
        (r.x + r.width / 2, r.y + r.height / 2)
    }

    #[test]
    fn test_pick_primary_prefers_primary_display() {
        let hdmi = Resolution::new(1920, 1080);
        let panel = Resolution::new(800, 480);
        assert_eq!(pick_primary(&[(false, hdmi), (true, panel)]), Some(panel));
        assert_eq!(pick_primary(&[(false, hdmi), (false, panel)]), Some(hdmi));
        assert_eq!(pick_primary(&[(true, Resolution::new(0, 0)), (false, panel)]), Some(panel));
        assert_eq!(pick_primary(&[]), None);
    }

    #[test]
    fn test_hit_test_strip_buttons() {
        let l = layout();
        let (x, y) = center(l.exit_button);
        assert_eq!(hit_test(&l, false, x, y), Some(UiEvent::ExitPressed));
        let (x, y) = center(l.shutdown_button);
        assert_eq!(hit_test(&l, false, x, y), Some(UiEvent::ShutdownPressed));
    }

    #[test]
    fn test_hit_test_viewport_is_inert() {
        let l = layout();
        assert_eq!(hit_test(&l, false, 10, 10), None);
    }

    #[test]
    fn test_dialog_is_modal() {
        let l = layout();
        let (x, y) = center(l.shutdown_button);
        assert_eq!(hit_test(&l, true, x, y), None);

        let (x, y) = center(l.confirm_button);
        assert_eq!(hit_test(&l, true, x, y), Some(UiEvent::ConfirmPressed));
        let (x, y) = center(l.cancel_button);
        assert_eq!(hit_test(&l, true, x, y), Some(UiEvent::CancelPressed));
    }

    #[test]
    fn test_dialog_drawing_stays_in_canvas() {
        let l = layout();
        let mut canvas = Canvas::new(l.window.width as usize, l.window.height as usize, 0);
        draw_controls(&mut canvas, &l);
        draw_dialog(&mut canvas, &l);
        let (x, y) = center(l.dialog);
        assert_ne!(canvas.pixels[y as usize * canvas.width + x as usize], 0);
    }
}
