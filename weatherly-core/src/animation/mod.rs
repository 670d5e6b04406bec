//! Weather particle animation.
//!
//! [`AnimationEngine`] owns one particle batch and at most one frame
//! registration. It never reads a clock: the host passes the elapsed time to
//! [`AnimationEngine::frame`].

pub mod config;
pub mod particle;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, trace};

use crate::model::WeatherSnapshot;
use crate::theme::{Intensity, WeatherCategory, weather_category, weather_intensity};

pub use config::{AnimationConfig, Span, Tiered};
pub use particle::{
    Bounds, Cloud, DustMote, Flash, FogPatch, Lightning, Particle, ParticleKind, RainDrop,
    Snowflake, Splash,
};

/// Longest step a single frame may take, in seconds.
const MAX_FRAME_DT: f64 = 0.25;

/// Conditions whose `main` field asks for blowing grit instead of a category batch.
const DUSTY_CONDITIONS: [&str; 3] = ["dust", "sand", "ash"];

/// What to animate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub category: WeatherCategory,
    pub intensity: Intensity,
    /// Cloud coverage in percent, when known.
    pub cloud_coverage: Option<u8>,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    pub dusty: bool,
}

impl AnimationRequest {
    pub fn new(category: WeatherCategory, intensity: Intensity) -> Self {
        Self { category, intensity, cloud_coverage: None, wind_speed: 0.0, dusty: false }
    }

    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        let main = snapshot.weather.main.to_lowercase();
        Self {
            category: weather_category(&snapshot.weather.main),
            intensity: weather_intensity(&snapshot.weather.description),
            cloud_coverage: Some(snapshot.details.clouds),
            wind_speed: snapshot.details.wind_speed,
            dusty: DUSTY_CONDITIONS.iter().any(|kind| main.contains(kind)),
        }
    }
}

/// Registration token of the engine's frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle {
    id: u64,
}

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub struct AnimationEngine {
    config: AnimationConfig,
    bounds: Bounds,
    rng: StdRng,
    active: Option<WeatherCategory>,
    dusty: bool,
    particles: Vec<Particle>,
    splashes: Vec<Splash>,
    flashes: Vec<Flash>,
    lightning: Option<Lightning>,
    dim: f64,
    clock: f64,
    frame: Option<FrameHandle>,
    next_frame_id: u64,
    registrations: u64,
    strikes: u64,
}

impl AnimationEngine {
    pub fn new(bounds: Bounds) -> Self {
        Self::with_rng(bounds, StdRng::from_entropy())
    }

    /// Same seed, same particles.
    pub fn with_seed(bounds: Bounds, seed: u64) -> Self {
        Self::with_rng(bounds, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bounds: Bounds, rng: StdRng) -> Self {
        Self {
            config: AnimationConfig::default(),
            bounds,
            rng,
            active: None,
            dusty: false,
            particles: Vec::new(),
            splashes: Vec::new(),
            flashes: Vec::new(),
            lightning: None,
            dim: 1.0,
            clock: 0.0,
            frame: None,
            next_frame_id: 1,
            registrations: 0,
            strikes: 0,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn active(&self) -> Option<WeatherCategory> {
        self.active
    }

    pub fn is_dusty(&self) -> bool {
        self.dusty
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn splashes(&self) -> &[Splash] {
        &self.splashes
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    /// Scene brightness multiplier; below 1 while a storm is running.
    pub fn dim(&self) -> f64 {
        self.dim
    }

    /// Strongest live flash, 0 when the sky is dark.
    pub fn flash_level(&self) -> f64 {
        self.flashes.iter().map(|f| f.opacity).fold(0.0, f64::max)
    }

    pub fn lightning(&self) -> Option<&Lightning> {
        self.lightning.as_ref()
    }

    pub fn strikes(&self) -> u64 {
        self.strikes
    }

    pub fn frame_handle(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// 0 or 1.
    pub fn active_frame_callbacks(&self) -> usize {
        usize::from(self.frame.is_some())
    }

    /// Registrations made over the engine's lifetime.
    pub fn frame_registrations(&self) -> u64 {
        self.registrations
    }

    /// Cancel the frame registration and drop everything on screen.
    pub fn clear(&mut self) {
        if let Some(handle) = self.frame.take() {
            trace!(id = handle.id, "frame callback cancelled");
        }
        self.particles.clear();
        self.splashes.clear();
        self.flashes.clear();
        self.lightning = None;
        self.active = None;
        self.dusty = false;
        self.dim = 1.0;
        self.clock = 0.0;
    }

    pub fn start(&mut self, request: &AnimationRequest) {
        debug!(
            category = %request.category,
            intensity = %request.intensity,
            dusty = request.dusty,
            "starting animation"
        );

        if request.dusty {
            self.create_dust();
            return;
        }

        match request.category {
            WeatherCategory::Clear => self.clear(),
            WeatherCategory::Cloudy => self.create_clouds(request.cloud_coverage),
            WeatherCategory::Rain => self.create_rain(request.intensity, request.wind_speed),
            WeatherCategory::Thunderstorm => {
                self.create_thunderstorm(request.intensity, request.wind_speed)
            }
            WeatherCategory::Snow => self.create_snow(request.intensity),
            WeatherCategory::Fog => self.create_fog(request.intensity),
        }
    }

    pub fn create_rain(&mut self, intensity: Intensity, wind_speed: f64) {
        let windy = wind_speed > self.config.rain.wind_threshold;
        self.spawn_rain(intensity, wind_speed, windy);
        self.active = Some(WeatherCategory::Rain);
        self.register_frame();
    }

    fn spawn_rain(&mut self, intensity: Intensity, wind_speed: f64, windy: bool) {
        self.clear();
        let cfg = &self.config.rain;
        let wind_px = if windy { wind_speed * cfg.wind_scale } else { 0.0 };
        let count = cfg.counts.get(intensity);
        self.particles = (0..count)
            .map(|_| Particle::Drop(RainDrop::spawn(cfg, wind_px, self.bounds, &mut self.rng)))
            .collect();
    }

    pub fn create_snow(&mut self, intensity: Intensity) {
        self.clear();
        let cfg = &self.config.snow;
        let count = cfg.counts.get(intensity);
        self.particles = (0..count)
            .map(|_| Particle::Flake(Snowflake::spawn(cfg, self.bounds, &mut self.rng)))
            .collect();
        self.active = Some(WeatherCategory::Snow);
        self.register_frame();
    }

    pub fn create_clouds(&mut self, coverage: Option<u8>) {
        self.clear();
        let cfg = &self.config.clouds;
        let count = cfg.count_for(coverage);
        self.particles = (0..count)
            .map(|_| Particle::Cloud(Cloud::spawn(cfg, self.bounds, &mut self.rng)))
            .collect();
        self.active = Some(WeatherCategory::Cloudy);
        self.register_frame();
    }

    pub fn create_fog(&mut self, intensity: Intensity) {
        self.clear();
        let cfg = &self.config.fog;
        let count = cfg.counts.get(intensity);
        self.particles = (0..count)
            .map(|_| Particle::Fog(FogPatch::spawn(cfg, self.bounds, &mut self.rng)))
            .collect();
        self.active = Some(WeatherCategory::Fog);
        self.register_frame();
    }

    /// Wind-blown rain under a dimmed sky, with lightning.
    pub fn create_thunderstorm(&mut self, intensity: Intensity, wind_speed: f64) {
        self.spawn_rain(intensity, wind_speed, true);
        self.active = Some(WeatherCategory::Thunderstorm);
        self.dim = self.config.lightning.dim;
        self.lightning = Some(Lightning::new(self.config.lightning.first_delay));
        self.register_frame();
    }

    /// Dust has no category of its own; it keeps the fog slot.
    pub fn create_dust(&mut self) {
        self.clear();
        let cfg = &self.config.dust;
        self.particles = (0..cfg.count)
            .map(|_| Particle::Dust(DustMote::spawn(cfg, self.bounds, &mut self.rng)))
            .collect();
        self.active = Some(WeatherCategory::Fog);
        self.dusty = true;
        self.register_frame();
    }

    fn register_frame(&mut self) {
        if let Some(old) = self.frame.take() {
            trace!(id = old.id, "replacing frame callback");
        }
        let handle = FrameHandle { id: self.next_frame_id };
        self.next_frame_id += 1;
        self.registrations += 1;
        self.frame = Some(handle);
        debug!(
            id = handle.id,
            particles = self.particles.len(),
            "frame callback registered"
        );
    }

    /// Advance the scene by `dt` seconds.
    ///
    /// Returns `false` without touching anything when no callback is registered.
    pub fn frame(&mut self, dt: f64) -> bool {
        if self.frame.is_none() {
            return false;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.clock += dt;

        let bounds = self.bounds;
        let clock = self.clock;
        let mut landed = Vec::new();

        for particle in &mut self.particles {
            match particle {
                Particle::Drop(drop) => {
                    if let Some(point) = drop.step(dt, bounds, &mut self.rng) {
                        landed.push(point);
                    }
                }
                Particle::Flake(flake) => flake.step(dt, clock, bounds, &mut self.rng),
                Particle::Cloud(cloud) => cloud.step(dt, bounds, &mut self.rng),
                Particle::Fog(patch) => patch.step(dt, bounds, &mut self.rng),
                Particle::Dust(mote) => mote.step(dt, bounds, &mut self.rng),
            }
        }

        let splash_cfg = &self.config.splash;
        self.splashes.retain_mut(|splash| splash.step(dt, splash_cfg));
        for (x, y) in landed {
            if self.splashes.len() >= splash_cfg.max_live {
                break;
            }
            self.splashes.push(Splash::new(x, y, splash_cfg));
        }

        self.flashes.retain_mut(|flash| flash.step(dt));
        self.run_lightning(dt);

        true
    }

    fn run_lightning(&mut self, dt: f64) {
        if self.active != Some(WeatherCategory::Thunderstorm) {
            return;
        }
        let Some(lightning) = self.lightning.as_mut() else {
            return;
        };
        if !lightning.advance(dt) {
            return;
        }

        let cfg = &self.config.lightning;
        lightning.reschedule(cfg.interval.sample(&mut self.rng));
        let x = self.rng.gen_range(0.0..=self.bounds.width);
        self.flashes.push(Flash::new(x, cfg));
        self.strikes += 1;
        trace!(x, next_in = lightning.next_in, "lightning strike");
    }

    /// Rescale everything to a new surface size. Non-positive sizes are ignored.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        let old = self.bounds;
        self.bounds = Bounds::new(width, height);
        if old.width <= 0.0 || old.height <= 0.0 {
            return;
        }

        let sx = width / old.width;
        let sy = height / old.height;
        for particle in &mut self.particles {
            particle.rescale(sx, sy);
        }
        for splash in &mut self.splashes {
            splash.x *= sx;
            splash.y *= sy;
        }
        for flash in &mut self.flashes {
            flash.x *= sx;
        }
    }
}
