//! Particle kinds and their motion rules.
//!
//! Every kind owns a distinct closed-form update; nothing here is a generic
//! integrator.

use rand::Rng;

use super::config::{
    CloudConfig, DustConfig, FogConfig, LightningConfig, RainConfig, SnowConfig, Span, SplashConfig,
};

/// Size of the animation surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Drop,
    Flake,
    Cloud,
    Fog,
    Dust,
}

/// A live particle of the active batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    Drop(RainDrop),
    Flake(Snowflake),
    Cloud(Cloud),
    Fog(FogPatch),
    Dust(DustMote),
}

impl Particle {
    pub fn kind(&self) -> ParticleKind {
        match self {
            Particle::Drop(_) => ParticleKind::Drop,
            Particle::Flake(_) => ParticleKind::Flake,
            Particle::Cloud(_) => ParticleKind::Cloud,
            Particle::Fog(_) => ParticleKind::Fog,
            Particle::Dust(_) => ParticleKind::Dust,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        match self {
            Particle::Drop(p) => (p.x, p.y),
            Particle::Flake(p) => (p.x, p.y),
            Particle::Cloud(p) => (p.x, p.y),
            Particle::Fog(p) => (p.x, p.y),
            Particle::Dust(p) => (p.x, p.y),
        }
    }

    pub fn opacity(&self) -> f64 {
        match self {
            Particle::Drop(p) => p.opacity,
            Particle::Flake(p) => p.opacity,
            Particle::Cloud(p) => p.opacity,
            Particle::Fog(p) => p.opacity,
            Particle::Dust(p) => p.opacity,
        }
    }

    pub fn opacity_range(&self) -> Span {
        match self {
            Particle::Drop(p) => p.opacity_range,
            Particle::Flake(p) => p.opacity_range,
            Particle::Cloud(p) => p.opacity_range,
            Particle::Fog(p) => p.opacity_range,
            Particle::Dust(p) => p.opacity_range,
        }
    }

    pub(crate) fn rescale(&mut self, sx: f64, sy: f64) {
        match self {
            Particle::Drop(p) => {
                p.x *= sx;
                p.y *= sy;
            }
            Particle::Flake(p) => {
                p.base_x *= sx;
                p.x *= sx;
                p.y *= sy;
            }
            Particle::Cloud(p) => {
                p.x *= sx;
                p.y *= sy;
            }
            Particle::Fog(p) => {
                p.x *= sx;
                p.y *= sy;
            }
            Particle::Dust(p) => {
                p.x *= sx;
                p.y *= sy;
            }
        }
    }
}

/// Angled streak falling fast; splashes on the ground.
#[derive(Debug, Clone, PartialEq)]
pub struct RainDrop {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub speed: f64,
    /// Horizontal velocity from fall angle plus wind.
    pub drift: f64,
    pub opacity: f64,
    pub opacity_range: Span,
}

impl RainDrop {
    pub fn spawn<R: Rng>(cfg: &RainConfig, wind_px: f64, bounds: Bounds, rng: &mut R) -> Self {
        let speed = cfg.speed.sample(rng);
        Self {
            x: rng.gen_range(0.0..=bounds.width),
            y: rng.gen_range(-bounds.height..=0.0),
            length: cfg.length.sample(rng),
            speed,
            drift: speed * cfg.angle_deg.to_radians().tan() + wind_px,
            opacity: cfg.opacity.sample(rng),
            opacity_range: cfg.opacity,
        }
    }

    /// Advance one frame. Returns the ground point when the drop lands.
    pub fn step<R: Rng>(&mut self, dt: f64, bounds: Bounds, rng: &mut R) -> Option<(f64, f64)> {
        let y = self.y + self.speed * dt;
        let mut landed = None;

        if y > bounds.height {
            landed = Some((self.x, (bounds.height - 20.0).max(0.0)));
            self.x = rng.gen_range(0.0..=bounds.width);
            self.y = -self.length;
        } else {
            self.y = y;
            self.x += self.drift * dt;
            if self.x > bounds.width {
                self.x -= bounds.width;
            } else if self.x < 0.0 {
                self.x += bounds.width;
            }
        }

        self.opacity = self.opacity_range.sample(rng);
        landed
    }
}

/// Expanding ring left by a landed drop.
#[derive(Debug, Clone, PartialEq)]
pub struct Splash {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Splash {
    pub fn new(x: f64, y: f64, cfg: &SplashConfig) -> Self {
        Self { x, y, scale: 1.0, opacity: cfg.opacity }
    }

    /// Returns `false` once fully faded.
    pub fn step(&mut self, dt: f64, cfg: &SplashConfig) -> bool {
        self.scale += cfg.growth_per_sec * dt;
        self.opacity -= cfg.fade_per_sec * dt;
        self.opacity > 0.0
    }
}

/// Slow linear fall with sinusoidal sway around `base_x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snowflake {
    pub base_x: f64,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub fall_speed: f64,
    pub sway_amount: f64,
    pub sway_speed: f64,
    pub sway_offset: f64,
    /// Spin in degrees, for renderers that rotate glyphs.
    pub rotation: f64,
    pub opacity: f64,
    pub opacity_range: Span,
}

impl Snowflake {
    pub fn spawn<R: Rng>(cfg: &SnowConfig, bounds: Bounds, rng: &mut R) -> Self {
        let base_x = rng.gen_range(0.0..=bounds.width);
        Self {
            base_x,
            x: base_x,
            y: rng.gen_range(0.0..=bounds.height),
            size: cfg.size.sample(rng),
            fall_speed: cfg.speed.sample(rng),
            sway_amount: cfg.sway_amount,
            sway_speed: cfg.sway_speed.sample(rng),
            sway_offset: rng.gen_range(0.0..std::f64::consts::TAU),
            rotation: 0.0,
            opacity: cfg.opacity.sample(rng),
            opacity_range: cfg.opacity,
        }
    }

    /// `clock` is seconds since the animation started.
    pub fn step<R: Rng>(&mut self, dt: f64, clock: f64, bounds: Bounds, rng: &mut R) {
        let y = self.y + self.fall_speed * dt;

        if y > bounds.height {
            self.base_x = rng.gen_range(0.0..=bounds.width);
            self.x = self.base_x;
            self.y = -2.0 * self.size;
        } else {
            self.y = y;
            self.x = self.base_x + (clock * self.sway_speed + self.sway_offset).sin() * self.sway_amount;
            self.rotation = (clock * 50.0) % 360.0;
        }

        self.opacity = self.opacity_range.sample(rng);
    }
}

/// Horizontal drift, wrapping back to the left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub opacity: f64,
    pub opacity_range: Span,
}

impl Cloud {
    pub fn spawn<R: Rng>(cfg: &CloudConfig, bounds: Bounds, rng: &mut R) -> Self {
        let width = cfg.width.sample(rng);
        Self {
            x: rng.gen_range(-width..=bounds.width),
            y: rng.gen_range(0.0..=bounds.height * cfg.band),
            width,
            height: width * cfg.aspect,
            speed: cfg.speed.sample(rng),
            opacity: cfg.opacity.sample(rng),
            opacity_range: cfg.opacity,
        }
    }

    pub fn step<R: Rng>(&mut self, dt: f64, bounds: Bounds, rng: &mut R) {
        self.x += self.speed * dt;
        if self.x > bounds.width + self.width {
            self.x = -self.width;
        }
        self.opacity = self.opacity_range.sample(rng);
    }
}

/// Soft patch drifting on both axes, wrapping on every edge.
#[derive(Debug, Clone, PartialEq)]
pub struct FogPatch {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
    pub opacity: f64,
    pub opacity_range: Span,
}

impl FogPatch {
    pub fn spawn<R: Rng>(cfg: &FogConfig, bounds: Bounds, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0.0..=bounds.width),
            y: rng.gen_range(0.0..=bounds.height),
            radius: cfg.radius.sample(rng),
            vx: cfg.drift.sample(rng),
            vy: cfg.drift.sample(rng),
            opacity: cfg.opacity.sample(rng),
            opacity_range: cfg.opacity,
        }
    }

    pub fn step<R: Rng>(&mut self, dt: f64, bounds: Bounds, rng: &mut R) {
        let r = self.radius;
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        if self.x > bounds.width + r {
            self.x = -r;
        } else if self.x < -r {
            self.x = bounds.width + r;
        }
        if self.y > bounds.height + r {
            self.y = -r;
        } else if self.y < -r {
            self.y = bounds.height + r;
        }

        self.opacity = self.opacity_range.sample(rng);
    }
}

/// Grit streaming sideways, re-entering on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct DustMote {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub rotation: f64,
    pub spin: f64,
    pub opacity: f64,
    pub opacity_range: Span,
}

const DUST_MARGIN: f64 = 50.0;

impl DustMote {
    pub fn spawn<R: Rng>(cfg: &DustConfig, bounds: Bounds, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(-DUST_MARGIN..=bounds.width),
            y: rng.gen_range(0.0..=bounds.height),
            size: cfg.size.sample(rng),
            vx: cfg.speed_x.sample(rng),
            vy: cfg.speed_y.sample(rng),
            rotation: rng.gen_range(0.0..std::f64::consts::TAU),
            spin: cfg.spin.sample(rng),
            opacity: cfg.opacity.sample(rng),
            opacity_range: cfg.opacity,
        }
    }

    pub fn step<R: Rng>(&mut self, dt: f64, bounds: Bounds, rng: &mut R) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.rotation += self.spin * dt;

        if self.x > bounds.width + DUST_MARGIN {
            self.x = -DUST_MARGIN;
            self.y = rng.gen_range(0.0..=bounds.height);
        }
        if self.y < 0.0 {
            self.y += bounds.height;
        } else if self.y > bounds.height {
            self.y -= bounds.height;
        }

        self.opacity = self.opacity_range.sample(rng);
    }
}

/// Sky-wide lightning flash centred on a bolt at `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub x: f64,
    pub age: f64,
    pub duration: f64,
    pub peak: f64,
    pub opacity: f64,
}

impl Flash {
    pub fn new(x: f64, cfg: &LightningConfig) -> Self {
        Self { x, age: 0.0, duration: cfg.duration, peak: cfg.peak_opacity, opacity: cfg.peak_opacity }
    }

    /// Linear fade from peak; returns `false` when over.
    pub fn step(&mut self, dt: f64) -> bool {
        self.age += dt;
        if self.age >= self.duration {
            self.opacity = 0.0;
            return false;
        }
        self.opacity = self.peak * (1.0 - self.age / self.duration);
        true
    }
}

/// Countdown to the next lightning strike.
#[derive(Debug, Clone, PartialEq)]
pub struct Lightning {
    pub next_in: f64,
}

impl Lightning {
    pub fn new(first_delay: f64) -> Self {
        Self { next_in: first_delay }
    }

    /// Returns `true` when the countdown expires.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.next_in -= dt;
        self.next_in <= 0.0
    }

    pub fn reschedule(&mut self, delay: f64) {
        self.next_in = delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::config::AnimationConfig;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn raindrop_lands_and_respawns_above() {
        let cfg = AnimationConfig::default();
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut drop = RainDrop::spawn(&cfg.rain, 0.0, bounds, &mut rng);
        drop.y = 599.0;

        let landed = drop.step(0.1, bounds, &mut rng);

        assert_eq!(landed.map(|(_, y)| y), Some(580.0));
        assert_eq!(drop.y, -drop.length);
        assert!(cfg.rain.opacity.contains(drop.opacity));
    }

    #[test]
    fn raindrop_falls_at_an_angle() {
        let cfg = AnimationConfig::default();
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(2);
        let mut drop = RainDrop::spawn(&cfg.rain, 0.0, bounds, &mut rng);
        drop.x = 100.0;
        drop.y = 0.0;

        assert!(drop.step(0.1, bounds, &mut rng).is_none());
        assert!((drop.y - drop.speed * 0.1).abs() < 1e-9);
        assert!(drop.x > 100.0);
    }

    #[test]
    fn splash_fades_out() {
        let cfg = AnimationConfig::default().splash;
        let mut splash = Splash::new(10.0, 10.0, &cfg);
        let mut frames = 0;
        while splash.step(1.0 / 60.0, &cfg) {
            frames += 1;
            assert!(frames < 100);
        }
        assert!(splash.scale > 1.0);
    }

    #[test]
    fn snowflake_sways_around_base() {
        let cfg = AnimationConfig::default();
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut flake = Snowflake::spawn(&cfg.snow, bounds, &mut rng);
        flake.y = 0.0;

        for i in 1..100 {
            flake.step(0.01, f64::from(i) * 0.01, bounds, &mut rng);
            assert!((flake.x - flake.base_x).abs() <= flake.sway_amount + 1e-9);
        }
    }

    #[test]
    fn fog_wraps_on_all_edges() {
        let cfg = AnimationConfig::default();
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(4);
        let mut patch = FogPatch::spawn(&cfg.fog, bounds, &mut rng);
        patch.radius = 100.0;

        patch.x = 899.0;
        patch.vx = 15.0;
        patch.step(1.0, bounds, &mut rng);
        assert_eq!(patch.x, -100.0);

        patch.y = -99.0;
        patch.vy = -15.0;
        patch.step(1.0, bounds, &mut rng);
        assert_eq!(patch.y, 700.0);
    }

    #[test]
    fn flash_fades_then_ends() {
        let cfg = AnimationConfig::default().lightning;
        let mut flash = Flash::new(50.0, &cfg);
        assert!(flash.step(0.15));
        assert!((flash.opacity - 0.4).abs() < 1e-9);
        assert!(!flash.step(0.2));
        assert_eq!(flash.opacity, 0.0);
    }

    #[test]
    fn lightning_countdown() {
        let mut lightning = Lightning::new(2.0);
        assert!(!lightning.advance(1.5));
        assert!(lightning.advance(0.5));
        lightning.reschedule(3.0);
        assert!(!lightning.advance(1.0));
    }
}
