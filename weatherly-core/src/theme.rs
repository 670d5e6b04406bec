//! Maps time of day and weather into a background theme.
//!
//! The engine is a pure lookup over a fixed palette table, plus a couple of
//! probabilistic overlays (rainbow, aurora) drawn from its own seedable RNG.

use chrono::{Local, NaiveTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(value: u32) -> Self {
        Self { r: (value >> 16) as u8, g: (value >> 8) as u8, b: value as u8 }
    }

    /// Shift every channel by `amount * 255`, clamped to the channel range.
    pub fn adjust_brightness(self, amount: f64) -> Self {
        let shift = |c: u8| (f64::from(c) + amount * 255.0).round().clamp(0.0, 255.0) as u8;
        Self { r: shift(self.r), g: shift(self.g), b: shift(self.b) }
    }

    /// Linear interpolation towards `other`.
    pub fn lerp(self, other: Rgb, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) * (1.0 - t) + f64::from(b) * t).round() as u8;
        Self { r: mix(self.r, other.r), g: mix(self.g, other.g), b: mix(self.b, other.b) }
    }

    /// Mean of the channels in `[0, 1]`.
    pub fn brightness(self) -> f64 {
        (f64::from(self.r) + f64::from(self.g) + f64::from(self.b)) / (3.0 * 255.0)
    }

    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Coarse period of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    Sunrise,
    Morning,
    Midday,
    Afternoon,
    Dusk,
    Night,
}

/// Half-open `[start, end)` hour ranges; night wraps past midnight.
const TIME_TABLE: [(TimeOfDay, f64, f64); 7] = [
    (TimeOfDay::Dawn, 4.5, 6.5),
    (TimeOfDay::Sunrise, 6.5, 7.5),
    (TimeOfDay::Morning, 7.5, 11.5),
    (TimeOfDay::Midday, 11.5, 14.5),
    (TimeOfDay::Afternoon, 14.5, 17.5),
    (TimeOfDay::Dusk, 17.5, 19.5),
    (TimeOfDay::Night, 19.5, 4.5),
];

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 7] = [
        TimeOfDay::Dawn,
        TimeOfDay::Sunrise,
        TimeOfDay::Morning,
        TimeOfDay::Midday,
        TimeOfDay::Afternoon,
        TimeOfDay::Dusk,
        TimeOfDay::Night,
    ];

    /// Bucket for a fractional hour, e.g. `7.25` for 07:15.
    pub fn from_hour(hour: f64) -> Self {
        for (period, start, end) in TIME_TABLE {
            let inside = if start > end {
                hour >= start || hour < end
            } else {
                hour >= start && hour < end
            };
            if inside {
                return period;
            }
        }
        TimeOfDay::Night
    }

    pub fn at(time: NaiveTime) -> Self {
        Self::from_hour(fractional_hour(time))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Sunrise => "sunrise",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Midday => "midday",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Dusk => "dusk",
            TimeOfDay::Night => "night",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-of-day bucket for the local wall clock.
pub fn current_time_of_day() -> TimeOfDay {
    TimeOfDay::at(Local::now().time())
}

fn fractional_hour(time: NaiveTime) -> f64 {
    f64::from(time.hour()) + f64::from(time.minute()) / 60.0
}

/// Coarse weather bucket driving both theme and animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Rain,
    Thunderstorm,
    Snow,
    Fog,
}

/// Checked in order; the first category with a matching keyword wins.
const CATEGORY_KEYWORDS: [(WeatherCategory, &[&str]); 6] = [
    (WeatherCategory::Clear, &["clear", "sunny"]),
    (
        WeatherCategory::Cloudy,
        &["cloudy", "partly cloudy", "overcast", "clouds", "scattered clouds", "broken clouds"],
    ),
    (
        WeatherCategory::Rain,
        &["rain", "drizzle", "showers", "light rain", "moderate rain", "heavy rain"],
    ),
    (WeatherCategory::Thunderstorm, &["thunderstorm", "thunder", "lightning"]),
    (WeatherCategory::Snow, &["snow", "sleet", "blizzard", "light snow", "heavy snow"]),
    (WeatherCategory::Fog, &["fog", "mist", "haze", "smoke"]),
];

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 6] = [
        WeatherCategory::Clear,
        WeatherCategory::Cloudy,
        WeatherCategory::Rain,
        WeatherCategory::Thunderstorm,
        WeatherCategory::Snow,
        WeatherCategory::Fog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "clear",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rain => "rain",
            WeatherCategory::Thunderstorm => "thunderstorm",
            WeatherCategory::Snow => "snow",
            WeatherCategory::Fog => "fog",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category for a free-form condition string; unknown strings are `Clear`.
pub fn weather_category(condition: &str) -> WeatherCategory {
    let lower = condition.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(WeatherCategory::Clear, |(category, _)| *category)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    #[default]
    Moderate,
    Heavy,
    Extreme,
}

const INTENSITY_KEYWORDS: [(Intensity, &[&str]); 4] = [
    (Intensity::Light, &["light", "slight", "weak"]),
    (Intensity::Moderate, &["moderate", "normal"]),
    (Intensity::Heavy, &["heavy", "strong", "intense"]),
    (Intensity::Extreme, &["extreme", "severe", "violent"]),
];

impl Intensity {
    pub const ALL: [Intensity; 4] =
        [Intensity::Light, Intensity::Moderate, Intensity::Heavy, Intensity::Extreme];

    /// Brightness shift applied to the palette.
    pub fn brightness_modifier(self) -> f64 {
        match self {
            Intensity::Light => 0.2,
            Intensity::Moderate => 0.0,
            Intensity::Heavy => -0.2,
            Intensity::Extreme => -0.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Moderate => "moderate",
            Intensity::Heavy => "heavy",
            Intensity::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intensity for a free-form description; defaults to `Moderate`.
pub fn weather_intensity(description: &str) -> Intensity {
    let lower = description.to_lowercase();
    INTENSITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(Intensity::Moderate, |(intensity, _)| *intensity)
}

/// Three-stop vertical gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub colors: [Rgb; 3],
    /// Stop positions in percent.
    pub stops: [u8; 3],
}

impl Gradient {
    const fn new(colors: [u32; 3], stops: [u8; 3]) -> Self {
        Self { colors: [Rgb::hex(colors[0]), Rgb::hex(colors[1]), Rgb::hex(colors[2])], stops }
    }

    const fn even(colors: [u32; 3]) -> Self {
        Self::new(colors, [0, 50, 100])
    }

    pub fn adjusted(&self, amount: f64) -> Self {
        Self { colors: self.colors.map(|c| c.adjust_brightness(amount)), stops: self.stops }
    }

    /// Colour at `t` in `[0, 1]` from top to bottom.
    pub fn sample(&self, t: f64) -> Rgb {
        let pos = t.clamp(0.0, 1.0) * 100.0;
        for i in 0..self.colors.len() - 1 {
            let (a, b) = (f64::from(self.stops[i]), f64::from(self.stops[i + 1]));
            if pos <= b {
                let span = (b - a).max(f64::EPSILON);
                return self.colors[i].lerp(self.colors[i + 1], (pos - a) / span);
            }
        }
        self.colors[self.colors.len() - 1]
    }

    pub fn average_brightness(&self) -> f64 {
        self.colors.iter().map(|c| c.brightness()).sum::<f64>() / self.colors.len() as f64
    }

    pub fn to_css(&self) -> String {
        let stops: Vec<String> = self
            .colors
            .iter()
            .zip(self.stops)
            .map(|(c, p)| format!("{} {p}%", c.to_css()))
            .collect();
        format!("linear-gradient(to bottom, {})", stops.join(", "))
    }
}

/// Indexed by `[TimeOfDay][WeatherCategory]`.
const BACKGROUNDS: [[Gradient; 6]; 7] = [
    // dawn
    [
        Gradient::even([0xFF6B6B, 0xFFE66D, 0x87CEEB]),
        Gradient::even([0xD3D3D3, 0xFFB6C1, 0x87CEEB]),
        Gradient::even([0x708090, 0xFFB6C1, 0x4682B4]),
        Gradient::even([0x2F4F4F, 0x708090, 0x696969]),
        Gradient::even([0xE6E6FA, 0xF0F8FF, 0xFFFFFF]),
        Gradient::even([0xC0C0C0, 0xD3D3D3, 0xDCDCDC]),
    ],
    // sunrise
    [
        Gradient::new([0xFF8C00, 0xFFD700, 0x87CEEB], [0, 30, 100]),
        Gradient::even([0xCD853F, 0xF0E68C, 0xB0C4DE]),
        Gradient::even([0x8B7355, 0xD2B48C, 0x778899]),
        Gradient::even([0x4B4B4D, 0x8B7D6B, 0x696969]),
        Gradient::even([0xFFE4E1, 0xFFF0F5, 0xF0FFFF]),
        Gradient::even([0xDEB887, 0xF5DEB3, 0xE0E0E0]),
    ],
    // morning
    [
        Gradient::even([0x00BFFF, 0x87CEEB, 0x87CEFA]),
        Gradient::even([0x4682B4, 0xB0C4DE, 0xD3D3D3]),
        Gradient::even([0x2F4F4F, 0x708090, 0x778899]),
        Gradient::even([0x191970, 0x2F4F4F, 0x483D8B]),
        Gradient::even([0xB0E0E6, 0xE0FFFF, 0xF0FFFF]),
        Gradient::even([0xA9A9A9, 0xC0C0C0, 0xD3D3D3]),
    ],
    // midday
    [
        Gradient::even([0x1E90FF, 0x00BFFF, 0x87CEEB]),
        Gradient::even([0x5F9EA0, 0x87CEEB, 0xB0C4DE]),
        Gradient::even([0x36454F, 0x708090, 0x8B9DC3]),
        Gradient::even([0x1C1C1C, 0x36454F, 0x4B0082]),
        Gradient::even([0xADD8E6, 0xE0FFFF, 0xFFFFFF]),
        Gradient::even([0xB0B0B0, 0xD0D0D0, 0xE0E0E0]),
    ],
    // afternoon
    [
        Gradient::even([0x4169E1, 0x6495ED, 0x87CEEB]),
        Gradient::even([0x6B8E23, 0x9ACD32, 0xB0C4DE]),
        Gradient::even([0x3B3C36, 0x696969, 0x808080]),
        Gradient::even([0x1B1B1B, 0x3B3C36, 0x483D8B]),
        Gradient::even([0x9AC0CD, 0xCAE1FF, 0xF0F8FF]),
        Gradient::even([0xA8A8A8, 0xC8C8C8, 0xD8D8D8]),
    ],
    // dusk
    [
        Gradient::even([0xFF4500, 0xFF6347, 0xFFB6C1]),
        Gradient::even([0x8B4513, 0xCD853F, 0xDEB887]),
        Gradient::even([0x483D8B, 0x6A5ACD, 0x9370DB]),
        Gradient::even([0x191970, 0x483D8B, 0x4B0082]),
        Gradient::even([0x9370DB, 0xDDA0DD, 0xEE82EE]),
        Gradient::even([0x696969, 0x808080, 0xA9A9A9]),
    ],
    // night
    [
        Gradient::even([0x000428, 0x004E92, 0x191970]),
        Gradient::even([0x0F0F0F, 0x2F2F2F, 0x4F4F4F]),
        Gradient::even([0x000000, 0x191970, 0x000080]),
        Gradient::even([0x000000, 0x1C1C1C, 0x2F4F4F]),
        Gradient::even([0x191970, 0x4B0082, 0x6A0DAD]),
        Gradient::even([0x1C1C1C, 0x2F2F2F, 0x3F3F3F]),
    ],
];

/// Unadjusted palette for a period and category.
pub fn base_gradient(time_of_day: TimeOfDay, category: WeatherCategory) -> Gradient {
    BACKGROUNDS[time_of_day.index()][category.index()]
}

/// Overlay drawn on top of the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialEffect {
    Rainbow,
    Aurora,
}

impl SpecialEffect {
    /// Colour bands of the overlay, outermost first.
    pub fn bands(&self) -> &'static [Rgb] {
        const RAINBOW: [Rgb; 7] = [
            Rgb::hex(0xFF0000),
            Rgb::hex(0xFF7F00),
            Rgb::hex(0xFFFF00),
            Rgb::hex(0x00FF00),
            Rgb::hex(0x0000FF),
            Rgb::hex(0x4B0082),
            Rgb::hex(0x9400D3),
        ];
        const AURORA: [Rgb; 3] = [Rgb::hex(0x00FF00), Rgb::hex(0x0000FF), Rgb::hex(0xFF00FF)];

        match self {
            SpecialEffect::Rainbow => &RAINBOW,
            SpecialEffect::Aurora => &AURORA,
        }
    }
}

/// Probability of each overlay when its preconditions hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialOdds {
    pub rainbow: f64,
    pub aurora: f64,
}

impl Default for SpecialOdds {
    fn default() -> Self {
        Self { rainbow: 0.15, aurora: 0.05 }
    }
}

/// Aurora needs a clear night beyond this absolute latitude.
pub const AURORA_MIN_LATITUDE: f64 = 55.0;

/// Foreground that stays readable on the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTone {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeResult {
    pub time_of_day: TimeOfDay,
    pub category: WeatherCategory,
    pub intensity: Intensity,
    pub gradient: Gradient,
    pub special: Option<SpecialEffect>,
    /// `None` when the palette is mid-bright and the current tone can stay.
    pub text_tone: Option<TextTone>,
}

/// Resolves themes and remembers the previous category for the rainbow check.
#[derive(Debug)]
pub struct ThemeEngine {
    odds: SpecialOdds,
    previous: Option<WeatherCategory>,
    rng: StdRng,
}

impl Default for ThemeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic overlay draws.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self { odds: SpecialOdds::default(), previous: None, rng }
    }

    pub fn with_odds(mut self, odds: SpecialOdds) -> Self {
        self.odds = odds;
        self
    }

    /// Resolve the theme for a condition at a wall-clock time.
    ///
    /// `latitude` only matters for the aurora check; pass `None` when unknown.
    pub fn apply(
        &mut self,
        condition: &str,
        description: &str,
        time: NaiveTime,
        latitude: Option<f64>,
    ) -> ThemeResult {
        let time_of_day = TimeOfDay::at(time);
        let category = weather_category(condition);
        let intensity = weather_intensity(description);

        let base = base_gradient(time_of_day, category);
        let modifier = intensity.brightness_modifier();
        let gradient = if modifier == 0.0 { base } else { base.adjusted(modifier) };

        let special = self.special_effect(time_of_day, category, latitude);
        // An overlay leaves the previous category in place.
        if special.is_none() {
            self.previous = Some(category);
        }

        let text_tone = text_tone(&base);

        debug!(%time_of_day, %category, %intensity, ?special, "theme applied");

        ThemeResult { time_of_day, category, intensity, gradient, special, text_tone }
    }

    fn special_effect(
        &mut self,
        time_of_day: TimeOfDay,
        category: WeatherCategory,
        latitude: Option<f64>,
    ) -> Option<SpecialEffect> {
        if category != WeatherCategory::Clear {
            return None;
        }

        let daylight = matches!(time_of_day, TimeOfDay::Morning | TimeOfDay::Afternoon);
        if daylight
            && self.previous == Some(WeatherCategory::Rain)
            && self.rng.gen_bool(self.odds.rainbow.clamp(0.0, 1.0))
        {
            return Some(SpecialEffect::Rainbow);
        }

        let high_latitude = latitude.is_some_and(|lat| lat.abs() > AURORA_MIN_LATITUDE);
        if time_of_day == TimeOfDay::Night
            && high_latitude
            && self.rng.gen_bool(self.odds.aurora.clamp(0.0, 1.0))
        {
            return Some(SpecialEffect::Aurora);
        }

        None
    }
}

fn text_tone(gradient: &Gradient) -> Option<TextTone> {
    let brightness = gradient.average_brightness();
    if brightness < 0.3 {
        Some(TextTone::Light)
    } else if brightness > 0.7 {
        Some(TextTone::Dark)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn time_table_boundaries() {
        assert_eq!(TimeOfDay::at(at(4, 29)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::at(at(4, 30)), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::at(at(6, 30)), TimeOfDay::Sunrise);
        assert_eq!(TimeOfDay::at(at(7, 30)), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::at(at(12, 0)), TimeOfDay::Midday);
        assert_eq!(TimeOfDay::at(at(14, 30)), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::at(at(17, 30)), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::at(at(19, 30)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::at(at(0, 0)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::at(at(23, 59)), TimeOfDay::Night);
    }

    #[test]
    fn nonsense_hours_fall_back_to_night() {
        assert_eq!(TimeOfDay::from_hour(f64::NAN), TimeOfDay::Night);
    }

    #[test]
    fn categories_follow_keyword_table() {
        assert_eq!(weather_category("Clear"), WeatherCategory::Clear);
        assert_eq!(weather_category("Clouds"), WeatherCategory::Cloudy);
        assert_eq!(weather_category("Overcast"), WeatherCategory::Cloudy);
        assert_eq!(weather_category("Drizzle"), WeatherCategory::Rain);
        assert_eq!(weather_category("Thunderstorm"), WeatherCategory::Thunderstorm);
        assert_eq!(weather_category("Sleet"), WeatherCategory::Snow);
        assert_eq!(weather_category("Mist"), WeatherCategory::Fog);
        assert_eq!(weather_category("Smoke"), WeatherCategory::Fog);
        // Rain is checked before thunderstorm.
        assert_eq!(weather_category("thunderstorm with light rain"), WeatherCategory::Rain);
    }

    #[test]
    fn unknown_conditions_are_clear() {
        for condition in ["", "Tornado", "Squall", "???", "Dust"] {
            assert_eq!(weather_category(condition), WeatherCategory::Clear);
        }
    }

    #[test]
    fn every_condition_maps_into_the_fixed_set() {
        let samples = [
            "Clear", "Clouds", "Rain", "Drizzle", "Thunderstorm", "Snow", "Mist", "Smoke", "Haze",
            "Dust", "Fog", "Sand", "Ash", "Squall", "Tornado", "sunny", "showers", "blizzard",
        ];
        for condition in samples {
            assert!(WeatherCategory::ALL.contains(&weather_category(condition)));
        }
    }

    #[test]
    fn intensity_keywords() {
        assert_eq!(weather_intensity("Light Rain"), Intensity::Light);
        assert_eq!(weather_intensity("heavy intensity rain"), Intensity::Heavy);
        assert_eq!(weather_intensity("Violent storm"), Intensity::Extreme);
        assert_eq!(weather_intensity("clear sky"), Intensity::Moderate);
        assert_eq!(weather_intensity(""), Intensity::Moderate);
    }

    #[test]
    fn brightness_adjustment_stays_in_channel_range() {
        let mut amount = -1.0;
        while amount <= 1.0 {
            for row in BACKGROUNDS {
                for gradient in row {
                    let adjusted = gradient.adjusted(amount);
                    for (before, after) in gradient.colors.iter().zip(adjusted.colors) {
                        if amount >= 0.0 {
                            assert!(after.r >= before.r && after.g >= before.g && after.b >= before.b);
                        } else {
                            assert!(after.r <= before.r && after.g <= before.g && after.b <= before.b);
                        }
                    }
                }
            }
            amount += 0.05;
        }
        assert_eq!(Rgb::hex(0xF0F0F0).adjust_brightness(0.2), Rgb::WHITE);
        assert_eq!(Rgb::hex(0x101010).adjust_brightness(-0.4), Rgb::new(0, 0, 0));
    }

    #[test]
    fn moderate_keeps_base_palette_and_heavy_darkens() {
        let mut engine = ThemeEngine::with_seed(1);
        let noon = at(12, 0);

        let moderate = engine.apply("Rain", "moderate rain", noon, None);
        assert_eq!(moderate.gradient, base_gradient(TimeOfDay::Midday, WeatherCategory::Rain));

        let heavy = engine.apply("Rain", "heavy rain", noon, None);
        assert_eq!(heavy.intensity, Intensity::Heavy);
        assert_eq!(heavy.gradient, moderate.gradient.adjusted(-0.2));
    }

    #[test]
    fn css_keeps_stop_positions() {
        let css = base_gradient(TimeOfDay::Sunrise, WeatherCategory::Clear).to_css();
        assert_eq!(css, "linear-gradient(to bottom, #ff8c00 0%, #ffd700 30%, #87ceeb 100%)");
    }

    #[test]
    fn gradient_sampling_hits_stops() {
        let g = base_gradient(TimeOfDay::Night, WeatherCategory::Clear);
        assert_eq!(g.sample(0.0), g.colors[0]);
        assert_eq!(g.sample(0.5), g.colors[1]);
        assert_eq!(g.sample(1.0), g.colors[2]);
    }

    #[test]
    fn rainbow_needs_rain_then_clear_in_daylight() {
        let odds = SpecialOdds { rainbow: 1.0, aurora: 1.0 };
        let mut engine = ThemeEngine::with_seed(7).with_odds(odds);
        let morning = at(9, 0);

        assert_eq!(engine.apply("Clear", "", morning, None).special, None);
        engine.apply("Rain", "light rain", morning, None);
        assert_eq!(engine.apply("Clear", "", morning, None).special, Some(SpecialEffect::Rainbow));
        // Rain is still remembered after the rainbow.
        assert_eq!(engine.apply("Clear", "", morning, None).special, Some(SpecialEffect::Rainbow));

        // A clear evening forgets the rain.
        assert_eq!(engine.apply("Clear", "", at(19, 0), None).special, None);
        assert_eq!(engine.apply("Clear", "", morning, None).special, None);

        engine.apply("Rain", "", at(12, 0), None);
        assert_eq!(engine.apply("Clear", "", at(12, 0), None).special, None);
    }

    #[test]
    fn aurora_needs_clear_night_at_high_latitude() {
        let odds = SpecialOdds { rainbow: 0.0, aurora: 1.0 };
        let mut engine = ThemeEngine::with_seed(7).with_odds(odds);
        let night = at(23, 0);

        assert_eq!(engine.apply("Clear", "", night, Some(69.6)).special, Some(SpecialEffect::Aurora));
        assert_eq!(engine.apply("Clear", "", night, Some(-70.0)).special, Some(SpecialEffect::Aurora));
        assert_eq!(engine.apply("Clear", "", night, Some(51.5)).special, None);
        assert_eq!(engine.apply("Clear", "", night, None).special, None);
        assert_eq!(engine.apply("Snow", "", night, Some(69.6)).special, None);
        assert_eq!(engine.apply("Clear", "", at(12, 0), Some(69.6)).special, None);
    }

    #[test]
    fn zero_odds_never_produce_overlays() {
        let odds = SpecialOdds { rainbow: 0.0, aurora: 0.0 };
        let mut engine = ThemeEngine::with_seed(3).with_odds(odds);
        for _ in 0..50 {
            engine.apply("Rain", "", at(9, 0), None);
            assert_eq!(engine.apply("Clear", "", at(9, 0), Some(80.0)).special, None);
            assert_eq!(engine.apply("Clear", "", at(22, 0), Some(80.0)).special, None);
        }
    }

    #[test]
    fn same_seed_same_overlays() {
        let run = |seed| {
            let mut engine = ThemeEngine::with_seed(seed).with_odds(SpecialOdds { rainbow: 0.5, aurora: 0.5 });
            (0..40)
                .map(|i| {
                    let (cond, time) = if i % 2 == 0 { ("Rain", at(9, 0)) } else { ("Clear", at(22, 0)) };
                    engine.apply(cond, "", time, Some(70.0)).special
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn text_tone_follows_palette_brightness() {
        let mut engine = ThemeEngine::with_seed(0);
        let night = engine.apply("Clear", "", at(23, 0), None);
        assert_eq!(night.text_tone, Some(TextTone::Light));

        let snow = engine.apply("Snow", "", at(6, 0), None);
        assert_eq!(snow.text_tone, Some(TextTone::Dark));
    }
}
