//! Fixed per-category particle tables.
//!
//! Distances are logical pixels on the animation surface, speeds are pixels
//! per second.

use rand::Rng;

use crate::theme::Intensity;

/// Inclusive numeric range a parameter is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Symmetric range `[-amount, amount]`.
    pub const fn around_zero(amount: f64) -> Self {
        Self { min: -amount, max: amount }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min { self.min } else { rng.gen_range(self.min..=self.max) }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One value per intensity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiered<T> {
    pub light: T,
    pub moderate: T,
    pub heavy: T,
    pub extreme: T,
}

impl<T: Copy> Tiered<T> {
    pub fn get(&self, intensity: Intensity) -> T {
        match intensity {
            Intensity::Light => self.light,
            Intensity::Moderate => self.moderate,
            Intensity::Heavy => self.heavy,
            Intensity::Extreme => self.extreme,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    pub counts: Tiered<usize>,
    pub length: Span,
    pub speed: Span,
    /// Fall angle from vertical, degrees.
    pub angle_deg: f64,
    pub opacity: Span,
    /// Wind (m/s) above which drops are blown sideways.
    pub wind_threshold: f64,
    /// Pixels per second of drift per m/s of wind.
    pub wind_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplashConfig {
    pub opacity: f64,
    pub fade_per_sec: f64,
    pub growth_per_sec: f64,
    pub max_live: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnowConfig {
    pub counts: Tiered<usize>,
    pub size: Span,
    pub speed: Span,
    /// Horizontal sway amplitude.
    pub sway_amount: f64,
    /// Radians per second.
    pub sway_speed: Span,
    pub opacity: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudConfig {
    /// Used when cloud coverage is unknown.
    pub default_count: usize,
    /// Coverage percent represented by one cloud.
    pub coverage_per_cloud: f64,
    pub width: Span,
    /// Height as a fraction of width.
    pub aspect: f64,
    pub speed: Span,
    pub opacity: Span,
    /// Clouds stay in the top fraction of the surface.
    pub band: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FogConfig {
    pub counts: Tiered<usize>,
    pub radius: Span,
    pub drift: Span,
    pub opacity: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DustConfig {
    pub count: usize,
    pub size: Span,
    pub speed_x: Span,
    pub speed_y: Span,
    /// Radians per second.
    pub spin: Span,
    pub opacity: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightningConfig {
    /// Seconds between flashes.
    pub interval: Span,
    pub first_delay: f64,
    pub duration: f64,
    pub peak_opacity: f64,
    /// Scene brightness while the storm is active.
    pub dim: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub rain: RainConfig,
    pub splash: SplashConfig,
    pub snow: SnowConfig,
    pub clouds: CloudConfig,
    pub fog: FogConfig,
    pub dust: DustConfig,
    pub lightning: LightningConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rain: RainConfig {
                counts: Tiered { light: 50, moderate: 100, heavy: 200, extreme: 250 },
                length: Span::new(10.0, 30.0),
                speed: Span::new(600.0, 1000.0),
                angle_deg: 10.0,
                opacity: Span::new(0.4, 0.7),
                wind_threshold: 5.0,
                wind_scale: 6.0,
            },
            splash: SplashConfig {
                opacity: 0.4,
                fade_per_sec: 3.0,
                growth_per_sec: 12.0,
                max_live: 64,
            },
            snow: SnowConfig {
                counts: Tiered { light: 50, moderate: 100, heavy: 150, extreme: 200 },
                size: Span::new(5.0, 15.0),
                speed: Span::new(50.0, 150.0),
                sway_amount: 50.0,
                sway_speed: Span::new(1.0, 3.0),
                opacity: Span::new(0.4, 0.9),
            },
            clouds: CloudConfig {
                default_count: 6,
                coverage_per_cloud: 20.0,
                width: Span::new(100.0, 300.0),
                aspect: 0.6,
                speed: Span::new(20.0, 60.0),
                opacity: Span::new(0.3, 0.7),
                band: 0.6,
            },
            fog: FogConfig {
                counts: Tiered { light: 20, moderate: 30, heavy: 40, extreme: 50 },
                radius: Span::new(100.0, 250.0),
                drift: Span::around_zero(15.0),
                opacity: Span::new(0.1, 0.3),
            },
            dust: DustConfig {
                count: 100,
                size: Span::new(1.0, 4.0),
                speed_x: Span::new(180.0, 480.0),
                speed_y: Span::around_zero(60.0),
                spin: Span::around_zero(6.0),
                opacity: Span::new(0.1, 0.4),
            },
            lightning: LightningConfig {
                interval: Span::new(3.0, 8.0),
                first_delay: 2.0,
                duration: 0.3,
                peak_opacity: 0.8,
                dim: 0.7,
            },
        }
    }
}

impl CloudConfig {
    /// `ceil(coverage / 20)`, at least one cloud.
    pub fn count_for(&self, coverage: Option<u8>) -> usize {
        match coverage {
            Some(pct) => ((f64::from(pct) / self.coverage_per_cloud).ceil() as usize).max(1),
            None => self.default_count,
        }
    }
}
