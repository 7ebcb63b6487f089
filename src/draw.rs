// Software drawing into the window canvas: filled rectangles, outlines,
// image blits and a tiny 5x7 bitmap font for button labels.

use crate::types::Rect;

pub const BACKGROUND: u32 = 0x00_D3_D3_D3; // light gray behind the letterbox bars
pub const BUTTON_FACE: u32 = 0x00_E8_E8_E8;
pub const BUTTON_BORDER: u32 = 0x00_60_60_60;
pub const TEXT: u32 = 0x00_10_10_10;
pub const DIALOG_FACE: u32 = 0x00_F5_F5_F5;
pub const DIALOG_SHADE: u32 = 0x00_40_40_40;

/// Pixels the window shows, 0x00RRGGBB.
#[derive(Clone)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Put a pixel if (x,y) is inside bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.pixels[y * self.width + x] = color;
    }

    /// Fill `rect`, clipped to the canvas.
    pub fn fill_rect(&mut self, rect: Rect, color: u32) {
        let x0 = (rect.x as usize).min(self.width);
        let y0 = (rect.y as usize).min(self.height);
        let x1 = (rect.x as usize + rect.width as usize).min(self.width);
        let y1 = (rect.y as usize + rect.height as usize).min(self.height);
        for y in y0..y1 {
            self.pixels[y * self.width + x0..y * self.width + x1].fill(color);
        }
    }

    /// 1-pixel outline around `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, color: u32) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let (x0, y0) = (rect.x as i32, rect.y as i32);
        let (x1, y1) = (x0 + rect.width as i32 - 1, y0 + rect.height as i32 - 1);
        for x in x0..=x1 {
            self.put_pixel(x, y0, color);
            self.put_pixel(x, y1, color);
        }
        for y in y0..=y1 {
            self.put_pixel(x0, y, color);
            self.put_pixel(x1, y, color);
        }
    }

    /// Copy a `width x height` block of pixels with its top-left at (x,y).
    pub fn blit(&mut self, pixels: &[u32], width: usize, height: usize, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let copy_w = width.min(self.width - x);
        let copy_h = height.min(self.height - y);
        for row in 0..copy_h {
            let src = &pixels[row * width..row * width + copy_w];
            let dst_start = (y + row) * self.width + x;
            self.pixels[dst_start..dst_start + copy_w].copy_from_slice(src);
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase, digits, a little punctuation) ---------- */

/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

/// Width in pixels of `text` drawn at `scale`; glyphs are 5 wide plus 1 spacing.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 { 0 } else { (n * 6 - 1) * scale }
}

/// Height in pixels of a line of text at `scale`.
pub fn text_height(scale: u32) -> u32 {
    7 * scale
}

/// Draw a single glyph with its top-left at (x,y), each font pixel a `scale` square.
fn draw_char_5x7(canvas: &mut Canvas, x: i32, y: i32, ch: char, scale: i32, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (ry, rowbits) in rows.iter().enumerate() {
        for rx in 0..5 {
            if (rowbits & (1 << (4 - rx))) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    canvas.put_pixel(x + rx * scale + dx, y + ry as i32 * scale + dy, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
pub fn draw_text_5x7(canvas: &mut Canvas, mut x: i32, y: i32, text: &str, scale: u32, color: u32) {
    let scale = scale.max(1) as i32;
    for ch in text.chars() {
        draw_char_5x7(canvas, x, y, ch, scale, color);
        x += 6 * scale;
    }
}

/// Draw `text` centered in `rect`.
pub fn draw_text_centered(canvas: &mut Canvas, rect: Rect, text: &str, scale: u32, color: u32) {
    let x = rect.x as i32 + (rect.width as i32 - text_width(text, scale) as i32) / 2;
    let y = rect.y as i32 + (rect.height as i32 - text_height(scale) as i32) / 2;
    draw_text_5x7(canvas, x, y, text, scale, color);
}

/// A flat button: face, border, centered label.
pub fn draw_button(canvas: &mut Canvas, rect: Rect, label: &str) {
    canvas.fill_rect(rect, BUTTON_FACE);
    canvas.stroke_rect(rect, BUTTON_BORDER);
    let scale = if rect.height >= 24 { 2 } else { 1 };
    draw_text_centered(canvas, rect, label, scale, TEXT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut c = Canvas::new(4, 4, 0);
        c.fill_rect(Rect::new(2, 2, 10, 10), 7);
        assert_eq!(c.pixels.iter().filter(|&&p| p == 7).count(), 4);
        assert_eq!(c.pixels[2 * 4 + 2], 7);
        assert_eq!(c.pixels[0], 0);
    }

    #[test]
    fn test_blit_places_block_at_offset() {
        let mut c = Canvas::new(4, 3, 0);
        c.blit(&[1, 2, 3, 4], 2, 2, 1, 1);
        assert_eq!(c.pixels, vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0]);
    }

    #[test]
    fn test_blit_clips_at_edges() {
        let mut c = Canvas::new(2, 2, 0);
        c.blit(&[1, 2, 3, 4], 2, 2, 1, 1);
        assert_eq!(c.pixels, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_labels_have_glyphs() {
        for label in ["EXIT", "SHUTDOWN", "SHUT DOWN DEVICE?", "YES", "NO"] {
            assert!(label.chars().all(|c| glyph5x7(c).is_some()), "{label}");
        }
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("EXIT", 2), (4 * 6 - 1) * 2);
    }

    #[test]
    fn test_stroke_rect_draws_border_only() {
        let mut c = Canvas::new(3, 3, 0);
        c.stroke_rect(Rect::new(0, 0, 3, 3), 1);
        assert_eq!(c.pixels, vec![1, 1, 1, 1, 0, 1, 1, 1, 1]);
    }
}
