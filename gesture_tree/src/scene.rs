//! Scene state — the presentation side of the interaction mode.
//!
//! Every element has two homes: a spot on the tree and a random spot in a
//! scatter sphere.  `FORMED` pulls everything onto the tree, `CHAOS` lets it
//! drift out, and `PHOTO_VIEW` brings the focused photo to centre stage in
//! front of the camera while the rest fall back.
//!
//! Nothing here feeds back into gesture handling except
//! [`Scene::photo_count`].

use std::f32::consts::PI;

use hand_gesture::InteractionMode;
use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// Dimensions and palette
// ════════════════════════════════════════════════════════════════════════════

pub const TREE_HEIGHT:  f32 = 18.0;
pub const TREE_RADIUS:  f32 = 7.5;
pub const CHAOS_RADIUS: f32 = 35.0;

const GOLDEN_ANGLE: f32 = 2.39996;
const ORNAMENT_TURNS: f32 = 8.0;

pub const MATTE_GREEN:   u32 = 0xFF0F3B23;
pub const LIGHT_GREEN:   u32 = 0xFF4A7C59;
pub const METALLIC_GOLD: u32 = 0xFFFFD700;
pub const CHRISTMAS_RED: u32 = 0xFFD42426;
pub const SNOW_WHITE:    u32 = 0xFFFFFFFF;
pub const BACKGROUND:    u32 = 0xFF020502;

/// Per-frame easing of the formation progress.
const PROGRESS_RATE: f32 = 0.03;
/// Camera orbit per frame while the tree is assembled.
const ORBIT_RATE: f32 = 0.0035;
const FRAME_DT: f32 = 1.0 / 60.0;

// ════════════════════════════════════════════════════════════════════════════
// Vec3
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self { Vec3 { x, y, z } }

    pub fn lerp(self, to: Vec3, t: f32) -> Vec3 {
        Vec3::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
        )
    }

    /// Rotate about the vertical axis.
    pub fn rotate_y(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
    }

    pub fn distance(self, other: Vec3) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Layout helpers
// ════════════════════════════════════════════════════════════════════════════

/// Uniform random point inside the scatter sphere.
pub fn chaos_position<R: Rng>(rng: &mut R) -> Vec3 {
    let theta = 2.0 * PI * rng.gen::<f32>();
    let phi   = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let r     = rng.gen::<f32>().cbrt() * CHAOS_RADIUS;
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Foliage point `i` of `total` on a golden-angle spiral filling the cone.
pub fn tree_position<R: Rng>(i: usize, total: usize, rng: &mut R) -> Vec3 {
    let h = i as f32 / total.max(1) as f32;
    let r_max = TREE_RADIUS * (1.0 - h);
    let angle = i as f32 * GOLDEN_ANGLE;
    let r = r_max * rng.gen::<f32>().sqrt();
    Vec3::new(r * angle.cos(), h * TREE_HEIGHT - TREE_HEIGHT / 2.0, r * angle.sin())
}

/// Ornament `i` of `count` on an eight-turn spiral just inside the foliage.
pub fn ornament_position(i: usize, count: usize) -> Vec3 {
    let h = i as f32 / count.max(1) as f32;
    let r = TREE_RADIUS * (1.0 - h) * 0.9;
    let angle = h * PI * 2.0 * ORNAMENT_TURNS;
    Vec3::new(r * angle.cos(), h * TREE_HEIGHT - TREE_HEIGHT / 2.0, r * angle.sin())
}

/// Random point on the cone surface, jittered in and out so some cards
/// hide in the foliage and some float.
pub fn tree_surface_position<R: Rng>(rng: &mut R) -> Vec3 {
    let h = rng.gen::<f32>() * 0.9 + 0.05;
    let r_base = TREE_RADIUS * (1.0 - h);
    let r = (r_base + rng.gen::<f32>() * 2.5 - 1.0).max(0.5);
    let angle = rng.gen::<f32>() * PI * 2.0;
    Vec3::new(angle.cos() * r, h * TREE_HEIGHT - TREE_HEIGHT / 2.0, angle.sin() * r)
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend of two packed ARGB colors.
pub fn mix_color(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |c: u32, shift: u32| ((c >> shift) & 0xFF) as f32;
    let lerp = |shift: u32| (ch(a, shift) * (1.0 - t) + ch(b, shift) * t) as u32;
    0xFF000000 | (lerp(16) << 16) | (lerp(8) << 8) | lerp(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// Fixed perspective camera on the +z axis looking at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub fov_deg:  f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera { position: Vec3::new(0.0, 2.0, 40.0), fov_deg: 45.0 }
    }
}

impl Camera {
    /// Where a grabbed photo is held: 15 units in front of the lens.
    pub fn stage_point(&self) -> Vec3 {
        Vec3::new(self.position.x, self.position.y, self.position.z - 15.0)
    }

    /// Project a world point to pixel coordinates.  Returns `(sx, sy, depth)`
    /// or `None` when the point is behind the camera.
    pub fn project(&self, p: Vec3, width: usize, height: usize) -> Option<(f32, f32, f32)> {
        let depth = self.position.z - p.z;
        if depth <= 0.1 { return None; }
        let focal = (height as f32 / 2.0) / (self.fov_deg.to_radians() / 2.0).tan();
        let sx = width  as f32 / 2.0 + (p.x - self.position.x) * focal / depth;
        let sy = height as f32 / 2.0 - (p.y - self.position.y) * focal / depth;
        Some((sx, sy, depth))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Elements
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Foliage,
    Sphere,
    Gift,
}

/// Foliage point or ornament.
#[derive(Clone, Debug)]
pub struct Particle {
    pub kind:   ParticleKind,
    pub chaos:  Vec3,
    pub target: Vec3,
    pub color:  u32,
    /// Ornament travel speed multiplier; foliage follows the shared progress.
    pub speed:  f32,
    /// Current local position (ornaments only lerp on their own).
    pub pos:    Vec3,
}

/// A photo hung on the tree.
#[derive(Clone, Debug)]
pub struct PhotoCard {
    pub chaos:      Vec3,
    pub tree:       Vec3,
    pub sway_speed: f32,
    /// Current world position and scale.
    pub pos:        Vec3,
    pub scale:      f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Scene {
    pub particles: Vec<Particle>,
    pub photos:    Vec<PhotoCard>,
    pub camera:    Camera,
    /// 0.0 = fully scattered, 1.0 = fully assembled.
    pub progress:  f32,
    /// Hand-driven group rotation.
    pub yaw:       f32,
    /// Camera orbit accumulated while assembled.
    pub orbit:     f32,
    pub time:      f32,
}

impl Scene {
    /// Build a scene that starts assembled.
    pub fn new<R: Rng>(foliage: usize, ornaments: usize, rng: &mut R) -> Self {
        let mut particles = Vec::with_capacity(foliage + ornaments);

        for i in 0..foliage {
            let target = tree_position(i, foliage, rng);
            let h = (target.y + TREE_HEIGHT / 2.0) / TREE_HEIGHT;
            particles.push(Particle {
                kind:  ParticleKind::Foliage,
                chaos: chaos_position(rng),
                target,
                color: mix_color(MATTE_GREEN, LIGHT_GREEN, h * 0.8 + 0.1),
                speed: 1.0,
                pos:   target,
            });
        }

        for i in 0..ornaments {
            let target = ornament_position(i, ornaments);
            // 60% gold spheres, 40% red gifts
            let (kind, color) = if rng.gen::<f32>() > 0.6 {
                (ParticleKind::Gift, CHRISTMAS_RED)
            } else {
                (ParticleKind::Sphere, METALLIC_GOLD)
            };
            particles.push(Particle {
                kind,
                chaos: chaos_position(rng),
                target,
                color,
                speed: rng.gen::<f32>() * 1.5 + 0.5,
                pos:   target,
            });
        }

        Scene {
            particles,
            photos:   Vec::new(),
            camera:   Camera::default(),
            progress: 1.0,
            yaw:      0.0,
            orbit:    0.0,
            time:     0.0,
        }
    }

    pub fn add_photo<R: Rng>(&mut self, rng: &mut R) {
        let tree = tree_surface_position(rng);
        let chaos = chaos_position(rng);
        let pos = tree.rotate_y(self.view_yaw());
        self.photos.push(PhotoCard {
            chaos,
            tree,
            sway_speed: rng.gen::<f32>() * 0.5 + 0.5,
            pos,
            scale: 1.0,
        });
    }

    pub fn photo_count(&self) -> usize { self.photos.len() }

    /// Total rotation applied to the group (everything except the photo
    /// held at centre stage).
    pub fn view_yaw(&self) -> f32 { self.orbit + self.yaw }

    /// Advance one frame.
    ///
    /// `hand_x` is the normalized palm x; `focused` is the photo index in
    /// focus, if any.
    pub fn tick(&mut self, mode: InteractionMode, hand_x: f32, focused: Option<usize>) {
        self.time += FRAME_DT;

        let formed = mode == InteractionMode::Formed;
        let target_progress = if formed { 1.0 } else { 0.0 };
        self.progress += (target_progress - self.progress) * PROGRESS_RATE;

        if formed {
            self.orbit = (self.orbit + ORBIT_RATE) % (2.0 * PI);
            self.yaw = 0.0;
        } else {
            self.yaw = (hand_x - 0.5) * PI;
        }

        let ornament_rate = if formed { 0.04 } else { 0.02 };
        for p in self.particles.iter_mut().filter(|p| p.kind != ParticleKind::Foliage) {
            let goal = if formed { p.target } else { p.chaos };
            p.pos = p.pos.lerp(goal, (ornament_rate * p.speed).min(1.0));
        }

        self.tick_photos(mode, focused);
    }

    fn tick_photos(&mut self, mode: InteractionMode, focused: Option<usize>) {
        let yaw   = self.view_yaw();
        let time  = self.time;
        let stage = self.camera.stage_point();
        let rate  = if mode == InteractionMode::PhotoView { 0.1 } else { 0.04 };

        for (i, card) in self.photos.iter_mut().enumerate() {
            let phase = i as f32;
            let (goal, scale) = match mode {
                InteractionMode::PhotoView if focused == Some(i) => (stage, 6.0),
                InteractionMode::PhotoView => {
                    let back = Vec3::new(card.chaos.x, card.chaos.y, card.chaos.z - 10.0);
                    (back.rotate_y(yaw), 0.5)
                }
                InteractionMode::Formed => {
                    let sway = (time * card.sway_speed + phase).sin() * 0.05;
                    let local = Vec3::new(card.tree.x, card.tree.y + sway, card.tree.z);
                    (local.rotate_y(yaw), 1.2)
                }
                InteractionMode::Chaos => {
                    let bob = (time + phase).sin() * 0.02;
                    let local = Vec3::new(card.chaos.x, card.chaos.y + bob, card.chaos.z);
                    (local.rotate_y(yaw), 1.5)
                }
            };
            card.pos = card.pos.lerp(goal, rate);
            card.scale += (scale - card.scale) * rate;
        }
    }

    /// World position of a particle this frame.
    pub fn particle_world(&self, p: &Particle) -> Vec3 {
        let local = match p.kind {
            ParticleKind::Foliage => p.chaos.lerp(p.target, smoothstep(self.progress)),
            _                     => p.pos,
        };
        local.rotate_y(self.view_yaw())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
