//! On-screen geometry: the video viewport, the control strip and the
//! confirmation dialog. Computed once at startup and never resized.

use crate::types::{Rect, Resolution, Viewport};

/// Vertical gap between the viewport and the button strip.
pub const BUTTON_GAP: u32 = 10;
/// Height of the EXIT / SHUTDOWN buttons.
pub const BUTTON_HEIGHT: u32 = 30;

const DIALOG_WIDTH: u32 = 360;
const DIALOG_HEIGHT: u32 = 140;
const DIALOG_BUTTON_WIDTH: u32 = 120;

/// Whether the viewer owns the whole screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Fullscreen,
    Windowed,
}

/// Inputs for [`Layout::compute`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub screen: Resolution,
    pub mode: DisplayMode,
    /// Fraction of the screen width the windowed viewport uses.
    pub zoom: f64,
    /// Windowed viewport height never exceeds this fraction of the screen.
    pub max_height_fraction: f64,
}

/// Fixed geometry of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub mode: DisplayMode,
    pub window: Resolution,
    pub viewport: Viewport,
    pub exit_button: Rect,
    pub shutdown_button: Rect,
    pub dialog: Rect,
    pub confirm_button: Rect,
    pub cancel_button: Rect,
}

impl Layout {
    pub fn compute(params: &LayoutParams) -> Self {
        let screen = params.screen;
        let strip = BUTTON_GAP + BUTTON_HEIGHT;

        let (window, viewport) = match params.mode {
            DisplayMode::Fullscreen => {
                let viewport = Viewport {
                    width: screen.width,
                    height: screen.height.saturating_sub(strip).max(1),
                };
                (screen, viewport)
            }
            DisplayMode::Windowed => {
                // 16:9 rectangle, capped to a fraction of the screen height
                let mut width = (screen.width as f64 * params.zoom) as u32;
                let mut height = width * 9 / 16;
                let max_height = screen.height as f64 * params.max_height_fraction;
                if height as f64 > max_height {
                    height = max_height as u32;
                    width = height * 16 / 9;
                }
                let viewport = Viewport {
                    width: width.max(1),
                    height: height.max(1),
                };
                let window = Resolution::new(viewport.width, viewport.height + strip);
                (window, viewport)
            }
        };

        let button_y = viewport.height + BUTTON_GAP;
        let half = window.width / 2;
        let exit_button = Rect::new(0, button_y, half, BUTTON_HEIGHT);
        let shutdown_button = Rect::new(half, button_y, window.width - half, BUTTON_HEIGHT);

        let dialog_w = DIALOG_WIDTH.min(window.width);
        let dialog_h = DIALOG_HEIGHT.min(window.height);
        let dialog = Rect::new(
            (window.width - dialog_w) / 2,
            (window.height - dialog_h) / 2,
            dialog_w,
            dialog_h,
        );
        let dbw = DIALOG_BUTTON_WIDTH.min(dialog_w / 2);
        let dby = dialog.y + dialog_h.saturating_sub(BUTTON_HEIGHT + BUTTON_GAP);
        let confirm_button = Rect::new(dialog.x + dialog_w / 4 - dbw / 2, dby, dbw, BUTTON_HEIGHT);
        let cancel_button =
            Rect::new(dialog.x + dialog_w * 3 / 4 - dbw / 2, dby, dbw, BUTTON_HEIGHT);

        log::debug!(
            "layout {:?}: window {}, viewport {}x{}",
            params.mode,
            window,
            viewport.width,
            viewport.height
        );

        Self {
            mode: params.mode,
            window,
            viewport,
            exit_button,
            shutdown_button,
            dialog,
            confirm_button,
            cancel_button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: DisplayMode, w: u32, h: u32, zoom: f64) -> LayoutParams {
        LayoutParams {
            screen: Resolution::new(w, h),
            mode,
            zoom,
            max_height_fraction: 0.7,
        }
    }

    #[test]
    fn test_windowed_is_sixteen_by_nine() {
        let layout = Layout::compute(&params(DisplayMode::Windowed, 1920, 1200, 0.5));
        assert_eq!(layout.viewport, Viewport { width: 960, height: 540 });
        assert_eq!(layout.window, Resolution::new(960, 540 + BUTTON_GAP + BUTTON_HEIGHT));
    }

    #[test]
    fn test_windowed_height_is_capped() {
        // 1920 * 9/16 = 1080 > 0.7 * 1080 = 756
        let layout = Layout::compute(&params(DisplayMode::Windowed, 1920, 1080, 1.0));
        assert_eq!(layout.viewport.height, 756);
        assert_eq!(layout.viewport.width, 756 * 16 / 9);
    }

    #[test]
    fn test_fullscreen_keeps_buttons_on_screen() {
        let layout = Layout::compute(&params(DisplayMode::Fullscreen, 1280, 800, 1.0));
        assert_eq!(layout.window, Resolution::new(1280, 800));
        assert_eq!(layout.viewport.width, 1280);
        assert_eq!(layout.viewport.height, 800 - BUTTON_GAP - BUTTON_HEIGHT);
        assert_eq!(layout.exit_button.y + layout.exit_button.height, 800);
    }

    #[test]
    fn test_buttons_split_window_width() {
        let layout = Layout::compute(&params(DisplayMode::Windowed, 1921, 1200, 0.5));
        let w = layout.window.width;
        assert_eq!(layout.exit_button.x, 0);
        assert_eq!(layout.shutdown_button.x, layout.exit_button.width);
        assert_eq!(layout.exit_button.width + layout.shutdown_button.width, w);
    }

    #[test]
    fn test_dialog_buttons_inside_dialog() {
        let layout = Layout::compute(&params(DisplayMode::Windowed, 1920, 1080, 1.0));
        for b in [layout.confirm_button, layout.cancel_button] {
            assert!(layout.dialog.contains(b.x, b.y));
            assert!(layout.dialog.contains(b.x + b.width - 1, b.y + b.height - 1));
        }
        assert!(layout.confirm_button.x + layout.confirm_button.width <= layout.cancel_button.x);
    }
}
