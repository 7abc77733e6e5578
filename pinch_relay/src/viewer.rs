//! Software-rendered landmark viewer using `minifb` (feature = "viewer").
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                                                          │
//! │        hand skeletons in normalized image space          │
//! │                                                          │
//! │  LEFT HAND                              RIGHT HAND       │
//! │  index: 0.04 (0.97)                     index: 0.21 ...  │
//! │  ...                                    ...              │
//! │  frame 1234                          Q/Esc = quit        │
//! └──────────────────────────────────────────────────────────┘
//! ```

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use pinch_gesture::{Finger, HandObservation, HandSide, Landmark};

use crate::render::{HandPinches, Renderer};
use crate::source::Frame;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 720;
const PANEL_H:       usize = 120;
const PANEL_Y:       usize = WIN_H - PANEL_H;
const PANEL_RIGHT_X: usize = WIN_W - 250;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const PANEL_BG:      u32   = 0xFF0F3460;
const BONE_COLOR:    u32   = 0xFFAADDFF;
const JOINT_COLOR:   u32   = 0xFFEEEEEE;
const PINCH_COLOR:   u32   = 0xFF00FF00;
const OPEN_COLOR:    u32   = 0xFFFF4040;
const TEXT_COLOR:    u32   = 0xFFFFFFFF;
const DIM_COLOR:     u32   = 0xFF888888;

/// Landmark index pairs forming the hand skeleton.
const BONES: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

// ════════════════════════════════════════════════════════════════════════════
// Viewer
// ════════════════════════════════════════════════════════════════════════════

pub struct Viewer {
    window: Window,
    buf:    Vec<u32>,
}

impl Viewer {
    pub fn new() -> Result<Self, String> {
        let mut window = Window::new(
            "Pinch Relay — hand landmarks",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Viewer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
        })
    }

    // ── Hands ─────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &HandObservation, pinches: Option<&HandPinches>) {
        let Some(lms) = hand.landmarks.as_ref() else { return };
        let to_px = |i: usize| -> Option<(isize, isize)> {
            lms.get(i).map(to_screen)
        };

        for &(a, b) in BONES.iter() {
            if let (Some(pa), Some(pb)) = (to_px(a), to_px(b)) {
                self.draw_line(pa, pb, BONE_COLOR);
            }
        }
        for i in 0..lms.len() {
            if let Some((x, y)) = to_px(i) {
                self.fill_square(x, y, 3, JOINT_COLOR);
            }
        }

        // Highlight finger tips that are currently pinching.
        if let Some(hp) = pinches {
            for (finger, r) in &hp.results {
                if let Some((x, y)) = to_px(finger.tip_index()) {
                    let color = if r.is_pinching { PINCH_COLOR } else { OPEN_COLOR };
                    self.fill_square(x, y, 5, color);
                }
            }
        }
    }

    // ── Status panel ──────────────────────────────────────────────────────

    fn draw_panel(&mut self, frame: &Frame, pinches: &[HandPinches]) {
        self.fill_rect(0, PANEL_Y, WIN_W, PANEL_H, PANEL_BG);

        for hp in pinches {
            let x = if hp.side == HandSide::Left { 10 } else { PANEL_RIGHT_X };
            let title = format!("{} hand", hp.side);
            self.draw_label(&title, x, PANEL_Y + 10, TEXT_COLOR);

            for (row, finger) in Finger::ALL.iter().enumerate() {
                let y = PANEL_Y + 26 + row * 14;
                match hp.results.get(finger) {
                    Some(r) => {
                        let text = format!("{}: {:.2} ({:.2})", finger, r.distance, r.confidence);
                        let color = if r.is_pinching { PINCH_COLOR } else { OPEN_COLOR };
                        self.draw_label(&text, x, y, color);
                    }
                    None => {
                        let text = format!("{}: warming up", finger);
                        self.draw_label(&text, x, y, DIM_COLOR);
                    }
                }
            }
        }

        self.draw_label(&format!("frame {}", frame.index), 10, WIN_H - 12, DIM_COLOR);
        self.draw_label("Q/Esc = quit", PANEL_RIGHT_X, WIN_H - 12, DIM_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn fill_square(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < PANEL_Y {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    /// Bresenham line.
    fn draw_line(&mut self, (x0, y0): (isize, isize), (x1, y1): (isize, isize), color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font: 3×5 characters, scaled 2×.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * 2, y + row * 2, 2, 2, color);
                    }
                }
            }
            cx += 8; // 6 wide + 2 gap
            if cx + 8 > WIN_W { break; }
        }
    }
}

impl Renderer for Viewer {
    fn draw(&mut self, frame: &Frame, hands: &[HandObservation], pinches: &[HandPinches]) {
        self.buf.fill(BG_COLOR);
        for hand in hands {
            let hp = pinches.iter().find(|p| p.side == hand.side());
            self.draw_hand(hand, hp);
        }
        self.draw_panel(frame, pinches);
        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    fn poll_quit(&mut self) -> bool {
        !self.window.is_open()
            || self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }
}

/// Normalized landmark to pixel coordinates, clamped to one window size
/// beyond each edge so outliers cannot make line drawing run away.
fn to_screen(lm: &Landmark) -> (isize, isize) {
    let clamp = |v: f32, span: usize| -> isize {
        let span = span as f32;
        let px = if v.is_finite() { v * span } else { -span };
        px.clamp(-span, 2.0 * span) as isize
    };
    (clamp(lm.x, WIN_W), clamp(lm.y, PANEL_Y))
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
