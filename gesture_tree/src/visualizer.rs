//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ MERRY CHRISTMAS            [ MODE CAPTION ]                      │
//! │                                                                  │
//! │                    * particle tree / scatter *       GESTURE     │
//! │                     [photo cards]                    CONTROLS    │
//! │        (o) hand cursor                               [guide]     │
//! │                                                                  │
//! │  hand read-out                                                   │
//! │  status bar                                                      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use hand_gesture::{GestureLabel, HandShape, InteractionMode};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::error::{AppError, Result};
use crate::scene::{
    mix_color, ParticleKind, Scene, BACKGROUND, CHRISTMAS_RED, METALLIC_GOLD, SNOW_WHITE,
};
use crate::source::SimInput;
use crate::synth::HandPose;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:   usize = 960;
pub const WIN_H:   usize = 640;
const STATUS_Y:    usize = WIN_H - 36;
const GUIDE_X:     usize = WIN_W - 170;
const GUIDE_Y:     usize = WIN_H - 230;
const TEXT_BG:     u32   = 0xFF0B1A10;
const PANEL_BG:    u32   = 0xFF102418;
const DIM_TEXT:    u32   = 0xFF888888;
/// Photo card world width at scale 1.0.
const CARD_SIZE:   f32   = 1.6;

// ════════════════════════════════════════════════════════════════════════════
// HudView — what the overlay needs from the app each frame
// ════════════════════════════════════════════════════════════════════════════

pub struct HudView<'a> {
    pub mode:    InteractionMode,
    pub gesture: GestureLabel,
    /// Palm position when a hand is visible.
    pub hand:    Option<(f32, f32)>,
    pub shape:   Option<HandShape>,
    pub focus:   Option<usize>,
    pub photos:  usize,
    pub status:  &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    sim_tx:     Sender<SimInput>,
    /// When false the window only forwards photo/quit keys; hand frames
    /// come from elsewhere.
    drive_hand: bool,
    hand_shown: bool,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, drive_hand: bool) -> Result<Self> {
        let mut window = Window::new(
            "Gesture Tree",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BACKGROUND; WIN_W * WIN_H],
            sim_tx,
            drive_hand,
            hand_shown: true,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard/mouse and translate to SimInput events.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if one_shot(&self.window, Key::Q) {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }
        if one_shot(&self.window, Key::U) {
            let _ = self.sim_tx.send(SimInput::AddPhoto);
        }
        if !self.drive_hand { return true; }

        if one_shot(&self.window, Key::H) {
            self.hand_shown = !self.hand_shown;
        }

        let pose = if self.window.is_key_down(Key::F) {
            HandPose::Fist
        } else if self.window.is_key_down(Key::O) {
            HandPose::OpenPalm
        } else if self.window.is_key_down(Key::P) {
            HandPose::Pinch
        } else {
            HandPose::Relaxed
        };
        let (mx, my) = self.window
            .get_mouse_pos(MouseMode::Clamp)
            .unwrap_or((WIN_W as f32 / 2.0, WIN_H as f32 / 2.0));

        let _ = self.sim_tx.send(SimInput::Hand {
            pose: self.hand_shown.then_some(pose),
            x: mx / WIN_W as f32,
            y: my / WIN_H as f32,
        });
        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene, hud: &HudView) {
        self.buf.fill(BACKGROUND);

        self.draw_particles(scene);
        self.draw_photos(scene, hud.mode, hud.focus);

        if let Some((x, y)) = hud.hand {
            self.draw_hand_cursor(x, y, hud.gesture);
        }

        // ── Title and mode caption ────────────────────────────────────────
        self.draw_label_scaled("MERRY", 24, 20, 2, CHRISTMAS_RED);
        self.draw_label_scaled("CHRISTMAS", 24, 34, 3, METALLIC_GOLD);
        self.draw_label("INTERACTIVE TREE", 26, 56, 0xFFA0CFA0);

        let caption = hud.mode.label();
        let cw = caption.len() * 8;
        let cx = WIN_W / 2 - cw / 2;
        self.fill_rect(cx - 16, 16, cw + 32, 22, PANEL_BG);
        self.draw_border(cx - 16, 16, cw + 32, 22, METALLIC_GOLD);
        let dot = if hud.mode == InteractionMode::Formed { 0xFF22C55E } else { METALLIC_GOLD };
        self.fill_rect(cx - 10, 24, 4, 4, dot);
        self.draw_label_scaled(caption, cx, 22, 2, SNOW_WHITE);

        self.draw_guide(hud.mode);

        // ── Hand read-out ─────────────────────────────────────────────────
        let readout = match hud.shape {
            Some(s) => format!(
                "hand: {}  fingers={}  gap={:.3}  photos={}  focus={}",
                hud.gesture, s.extended_count, s.pinch_distance, hud.photos,
                hud.focus.map_or("-".to_string(), |f| f.to_string()),
            ),
            None => format!("hand: not visible  photos={}", hud.photos),
        };
        self.draw_label(&readout, 10, STATUS_Y - 14, DIM_TEXT);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(hud.status, 10, STATUS_Y + 10, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        let legend = if self.drive_hand {
            "mouse=move  F=fist  O=open  P=pinch  H=hide hand  U=add photo  Q=quit"
        } else {
            "U=add photo  Q=quit"
        };
        self.draw_label(legend, 10, WIN_H - 12, DIM_TEXT);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Scene ─────────────────────────────────────────────────────────────

    fn draw_particles(&mut self, scene: &Scene) {
        for p in &scene.particles {
            let world = scene.particle_world(p);
            let (sx, sy, depth) = match scene.camera.project(world, WIN_W, WIN_H) {
                Some(v) => v,
                None    => continue,
            };
            if sx < 0.0 || sy < 0.0 { continue; }
            let (x, y) = (sx as usize, sy as usize);
            match p.kind {
                ParticleKind::Foliage => {
                    let shade = blend(p.color, BACKGROUND, ((depth - 30.0) / 50.0).clamp(0.0, 0.7));
                    self.set_pixel(x, y, shade);
                }
                ParticleKind::Sphere | ParticleKind::Gift => {
                    let r = (40.0 / depth).clamp(1.0, 4.0) as usize;
                    if p.kind == ParticleKind::Sphere {
                        self.draw_diamond(x, y, r, p.color);
                    } else {
                        self.fill_rect(x.saturating_sub(r), y.saturating_sub(r), 2 * r, 2 * r, p.color);
                    }
                }
            }
        }
    }

    fn draw_photos(&mut self, scene: &Scene, mode: InteractionMode, focus: Option<usize>) {
        // Far cards first so the staged one ends up on top.
        let mut order: Vec<usize> = (0..scene.photos.len()).collect();
        order.sort_by(|&a, &b| scene.photos[a].pos.z.total_cmp(&scene.photos[b].pos.z));

        for i in order {
            let card = &scene.photos[i];
            let (sx, sy, depth) = match scene.camera.project(card.pos, WIN_W, WIN_H) {
                Some(v) => v,
                None    => continue,
            };
            let focal = (WIN_H as f32 / 2.0) / (scene.camera.fov_deg.to_radians() / 2.0).tan();
            let w = (CARD_SIZE * card.scale * focal / depth).max(3.0) as usize;
            let h = w * 5 / 4;
            let x0 = (sx - w as f32 / 2.0).max(0.0) as usize;
            let y0 = (sy - h as f32 / 2.0).max(0.0) as usize;

            let staged = mode == InteractionMode::PhotoView && focus == Some(i);
            let fill = mix_color(0xFF2A2A40, photo_tint(i), 0.6);
            self.fill_rect(x0, y0, w, h, fill);
            self.draw_border(x0, y0, w, h, if staged { SNOW_WHITE } else { METALLIC_GOLD });
            if w > 40 {
                self.draw_label(&format!("PHOTO {}", i + 1), x0 + 4, y0 + h.saturating_sub(10), SNOW_WHITE);
            }
        }
    }

    fn draw_hand_cursor(&mut self, x: f32, y: f32, gesture: GestureLabel) {
        let cx = (x.clamp(0.0, 1.0) * (WIN_W - 1) as f32) as usize;
        let cy = (y.clamp(0.0, 1.0) * (WIN_H - 1) as f32) as usize;
        let (r, color) = match gesture {
            GestureLabel::Fist     => (6,  0xFF22C55E),
            GestureLabel::OpenPalm => (14, METALLIC_GOLD),
            GestureLabel::Pinch    => (4,  SNOW_WHITE),
            GestureLabel::None     => (10, DIM_TEXT),
        };
        self.draw_diamond(cx, cy, r, color);
    }

    fn draw_guide(&mut self, mode: InteractionMode) {
        const ITEMS: [(&str, &str, InteractionMode); 4] = [
            ("ASSEMBLE",   "CLOSE FIST",    InteractionMode::Formed),
            ("SCATTER",    "OPEN HAND",     InteractionMode::Chaos),
            ("ROTATE",     "MOVE HAND",     InteractionMode::Chaos),
            ("VIEW PHOTO", "PINCH FINGERS", InteractionMode::PhotoView),
        ];

        self.draw_label("GESTURE CONTROLS", GUIDE_X, GUIDE_Y, METALLIC_GOLD);
        let mut y = GUIDE_Y + 16;
        for (title, desc, item_mode) in ITEMS {
            let active = item_mode == mode;
            if active {
                self.fill_rect(GUIDE_X - 6, y - 4, 160, 34, PANEL_BG);
                self.fill_rect(GUIDE_X - 6, y - 4, 2, 34, METALLIC_GOLD);
            }
            let title_color = if active { SNOW_WHITE } else { DIM_TEXT };
            self.draw_label_scaled(title, GUIDE_X, y, 2, title_color);
            self.draw_label(desc, GUIDE_X, y + 16, blend(METALLIC_GOLD, BACKGROUND, if active { 0.1 } else { 0.5 }));
            y += 42;
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r as isize {
            let dx = r as isize - dy;
            for &(sx, sy) in &[
                (cx as isize + dx, cy as isize + dy),
                (cx as isize - dx, cy as isize + dy),
                (cx as isize + dx, cy as isize - dy),
                (cx as isize - dx, cy as isize - dy),
            ] {
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_label_scaled(text, x, y, 1, color);
    }

    /// Minimal bitmap font — 3×5 glyphs, each pixel drawn as a
    /// `scale`×`scale` block.
    fn draw_label_scaled(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
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
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    mix_color(a, b, t)
}

/// Distinct placeholder tint per photo slot.
fn photo_tint(i: usize) -> u32 {
    const TINTS: [u32; 5] = [0xFFE8C07A, 0xFF7AB8E8, 0xFFE87A9C, 0xFF9CE87A, 0xFFC47AE8];
    TINTS[i % TINTS.len()]
}
