//! Rasterizes controller state into a grid of terminal cells.
//!
//! The animation works in logical pixels; one cell covers `CELL_W` x `CELL_H`
//! of them. Nothing here touches the terminal, so frames can be inspected in
//! tests.

use chrono::NaiveTime;
use weatherly_core::{
    Bounds, ViewState, WeatherController, cities,
    animation::{Particle, Splash},
    config::ThemePreference,
    theme::{Rgb, SpecialEffect},
    units::{convert_wind_speed, wind_direction, wind_speed_symbol},
};

use crate::render::{format_temperature, progress_bar};

pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

const NIGHT_SKY: Rgb = Rgb::hex(0x0F172A);
const RAIN: Rgb = Rgb::hex(0xAEC6E8);
const SNOW: Rgb = Rgb::WHITE;
const CLOUD: Rgb = Rgb::hex(0xE5E7EB);
const FOG: Rgb = Rgb::hex(0xC8CCD2);
const DUST: Rgb = Rgb::hex(0x8B4513);

const PANEL_WIDTH: u16 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    fn blank(bg: Rgb) -> Self {
        Self { ch: ' ', fg: bg, bg }
    }
}

#[derive(Debug, Clone)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows, cells: vec![Cell::blank(NIGHT_SKY); usize::from(cols) * usize::from(rows)] }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn row(&self, row: u16) -> &[Cell] {
        let start = usize::from(row) * usize::from(self.cols);
        &self.cells[start..start + usize::from(self.cols)]
    }

    pub fn get(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index(i64::from(col), i64::from(row)).map(|i| &self.cells[i])
    }

    fn index(&self, col: i64, row: i64) -> Option<usize> {
        let in_range = (0..i64::from(self.cols)).contains(&col)
            && (0..i64::from(self.rows)).contains(&row);
        in_range.then(|| (row * i64::from(self.cols) + col) as usize)
    }

    fn cell_at(&mut self, x: f64, y: f64) -> Option<&mut Cell> {
        let i = self.index((x / CELL_W).floor() as i64, (y / CELL_H).floor() as i64)?;
        Some(&mut self.cells[i])
    }

    /// Put a glyph at a pixel position, tinted `alpha` of the way to `color`.
    fn plot(&mut self, x: f64, y: f64, ch: char, color: Rgb, alpha: f64) {
        if let Some(cell) = self.cell_at(x, y) {
            cell.ch = ch;
            cell.fg = cell.bg.lerp(color, alpha);
        }
    }

    /// Blend the background of every cell within `radius` px of a point.
    fn wash(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: Rgb, alpha: f64) {
        let (c0, c1) = (((cx - rx) / CELL_W).floor() as i64, ((cx + rx) / CELL_W).ceil() as i64);
        let (r0, r1) = (((cy - ry) / CELL_H).floor() as i64, ((cy + ry) / CELL_H).ceil() as i64);
        for row in r0..=r1 {
            for col in c0..=c1 {
                let Some(i) = self.index(col, row) else {
                    continue;
                };
                let dx = ((col as f64 + 0.5) * CELL_W - cx) / rx;
                let dy = ((row as f64 + 0.5) * CELL_H - cy) / ry;
                let d = dx * dx + dy * dy;
                if d <= 1.0 {
                    let cell = &mut self.cells[i];
                    let a = alpha * (1.0 - d);
                    cell.bg = cell.bg.lerp(color, a);
                    cell.fg = cell.fg.lerp(color, a);
                }
            }
        }
    }

    fn text(&mut self, col: u16, row: u16, text: &str, fg: Rgb, bg: Rgb) {
        for (i, ch) in text.chars().enumerate() {
            if let Some(i) = self.index(i64::from(col) + i as i64, i64::from(row)) {
                self.cells[i] = Cell { ch, fg, bg };
            }
        }
    }
}

pub fn bounds_for(cols: u16, rows: u16) -> Bounds {
    Bounds::new(f64::from(cols) * CELL_W, f64::from(rows) * CELL_H)
}

/// Typing state of the search prompt, if open.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub search: Option<&'a str>,
    /// Seconds since the view opened; drives slow overlay motion.
    pub phase: f64,
}

/// Draw a full frame.
pub fn scene(canvas: &mut Canvas, controller: &WeatherController, clock: NaiveTime, overlay: Overlay<'_>) {
    let engine = controller.animation();
    sky(canvas, controller, engine.dim(), engine.flash_level());

    if let Some(special) = controller.theme().and_then(|t| t.special) {
        match special {
            SpecialEffect::Rainbow => rainbow(canvas),
            SpecialEffect::Aurora => aurora(canvas, overlay.phase),
        }
    }

    for particle in engine.particles() {
        draw_particle(canvas, particle);
    }
    for splash in engine.splashes() {
        draw_splash(canvas, splash);
    }

    panel(canvas, controller, clock, overlay.search);
}

fn sky(canvas: &mut Canvas, controller: &WeatherController, dim: f64, flash: f64) {
    let rows = canvas.rows.max(1);
    for row in 0..canvas.rows {
        let t = (f64::from(row) + 0.5) / f64::from(rows);
        let base = controller.theme().map_or(NIGHT_SKY, |theme| theme.gradient.sample(t));
        let bg = Rgb::new(0, 0, 0).lerp(base, dim).lerp(Rgb::WHITE, flash * 0.6);

        let start = usize::from(row) * usize::from(canvas.cols);
        for cell in &mut canvas.cells[start..start + usize::from(canvas.cols)] {
            *cell = Cell::blank(bg);
        }
    }
}

fn rainbow(canvas: &mut Canvas) {
    let w = f64::from(canvas.cols) * CELL_W;
    let h = f64::from(canvas.rows) * CELL_H;
    let (cx, cy) = (w / 2.0, h);
    let outer = h * 0.85;
    let band = CELL_H * 0.6;

    for (i, color) in SpecialEffect::Rainbow.bands().iter().enumerate() {
        let r_out = outer - i as f64 * band;
        ring(canvas, cx, cy, r_out - band, r_out, *color, 0.35);
    }
}

fn ring(canvas: &mut Canvas, cx: f64, cy: f64, r_in: f64, r_out: f64, color: Rgb, alpha: f64) {
    for row in 0..canvas.rows {
        for col in 0..canvas.cols {
            let x = (f64::from(col) + 0.5) * CELL_W - cx;
            let y = (f64::from(row) + 0.5) * CELL_H - cy;
            let d = (x * x + y * y).sqrt();
            if d >= r_in && d < r_out {
                let i = usize::from(row) * usize::from(canvas.cols) + usize::from(col);
                let cell = &mut canvas.cells[i];
                cell.bg = cell.bg.lerp(color, alpha);
            }
        }
    }
}

fn aurora(canvas: &mut Canvas, phase: f64) {
    let top = f64::from(canvas.rows) * 0.15;
    for (i, color) in SpecialEffect::Aurora.bands().iter().enumerate() {
        for col in 0..canvas.cols {
            let wave = (f64::from(col) * 0.12 + phase * 0.4 + i as f64).sin() * 1.5;
            let row = (top + i as f64 * 1.5 + wave).round();
            for (offset, alpha) in [(0.0, 0.3), (1.0, 0.15)] {
                if let Some(idx) = canvas.index(i64::from(col), (row + offset) as i64) {
                    let cell = &mut canvas.cells[idx];
                    cell.bg = cell.bg.lerp(*color, alpha);
                }
            }
        }
    }
}

fn draw_particle(canvas: &mut Canvas, particle: &Particle) {
    match particle {
        Particle::Drop(drop) => {
            let glyph = if drop.drift > 30.0 { '\\' } else if drop.drift < -30.0 { '/' } else { '|' };
            canvas.plot(drop.x, drop.y, glyph, RAIN, drop.opacity);
            canvas.plot(drop.x, drop.y - drop.length, glyph, RAIN, drop.opacity * 0.5);
        }
        Particle::Flake(flake) => {
            let glyph = if flake.size > 11.0 { '*' } else if flake.size > 7.0 { '+' } else { '.' };
            canvas.plot(flake.x, flake.y, glyph, SNOW, flake.opacity);
        }
        Particle::Cloud(cloud) => {
            let (rx, ry) = (cloud.width / 2.0, cloud.height / 2.0);
            canvas.wash(cloud.x + rx, cloud.y + ry, rx, ry, CLOUD, cloud.opacity * 0.6);
        }
        Particle::Fog(patch) => {
            canvas.wash(patch.x, patch.y, patch.radius, patch.radius, FOG, patch.opacity);
        }
        Particle::Dust(mote) => {
            let glyph = if mote.size > 2.5 { '•' } else { '·' };
            canvas.plot(mote.x, mote.y, glyph, DUST, (mote.opacity * 2.0).min(1.0));
        }
    }
}

fn draw_splash(canvas: &mut Canvas, splash: &Splash) {
    let glyph = if splash.scale < 2.0 { '.' } else { '~' };
    canvas.plot(splash.x, splash.y, glyph, RAIN, splash.opacity * 2.0);
}

/// Text lines of the info panel.
pub fn panel_lines(controller: &WeatherController, clock: NaiveTime, search: Option<&str>) -> Vec<String> {
    if let Some(input) = search {
        let mut lines = vec!["Search city".to_string(), format!("> {input}_"), String::new()];
        let suggestions = cities::suggest(input, 5);
        if input.trim().chars().count() < cities::MIN_QUERY_LEN {
            lines.push(format!("Try: {}", cities::QUICK_CITIES[..4].join(", ")));
        }
        lines.extend(suggestions.iter().map(|c| format!("  {c}")));
        lines.push(String::new());
        lines.push("Enter search   Esc cancel".into());
        return lines;
    }

    let prefs = controller.prefs();
    let temp_units = prefs.units.temperature;
    let wind_units = prefs.units.wind;

    let mut lines = Vec::new();
    match controller.snapshot() {
        Some(s) => {
            lines.push(format!("{}, {}", s.city, s.country));
            lines.push(format!(
                "{}  {}",
                format_temperature(s.temperature.current, temp_units),
                s.weather.description
            ));
            lines.push(format!(
                "Feels like {}   H {}  L {}",
                format_temperature(s.temperature.feels_like, temp_units),
                format_temperature(s.temperature.max, temp_units),
                format_temperature(s.temperature.min, temp_units)
            ));
            lines.push(format!(
                "Wind {:.1} {} {}",
                convert_wind_speed(s.details.wind_speed, wind_units),
                wind_speed_symbol(wind_units),
                wind_direction(s.details.wind_direction)
            ));
            lines.push(format!("Humidity {}%   Clouds {}%", s.details.humidity, s.details.clouds));
            if let Some(pct) = controller.sun_progress(clock) {
                lines.push(format!(
                    "{} {} {}",
                    s.sun.sunrise.format("%H:%M"),
                    progress_bar(pct, 16),
                    s.sun.sunset.format("%H:%M")
                ));
            }
            if let Some(forecast) = controller.forecast() {
                let days: Vec<String> = forecast
                    .entries
                    .iter()
                    .take(3)
                    .map(|e| {
                        let day: String = e.day.chars().take(3).collect();
                        format!("{day} {}", format_temperature(e.temperature.max, temp_units))
                    })
                    .collect();
                if !days.is_empty() {
                    lines.push(days.join("  "));
                }
            }
        }
        None => lines.push("weatherly".into()),
    }

    match controller.state() {
        ViewState::Idle => lines.push("Waiting for weather...".into()),
        ViewState::Loading => lines.push("Loading...".into()),
        ViewState::Ready => {}
        ViewState::Failed { message } => {
            lines.push(String::new());
            lines.push(format!("! {message}"));
            lines.push("Press r to retry".into());
        }
    }

    lines.push(String::new());
    lines.push("q quit  r refresh  / search  l locate".into());
    lines.push("t theme  u temp  w wind  a animation".into());
    lines
}

fn panel(canvas: &mut Canvas, controller: &WeatherController, clock: NaiveTime, search: Option<&str>) {
    let lines = panel_lines(controller, clock, search);
    let (fg, bg) = match controller.prefs().theme {
        ThemePreference::Dark => (Rgb::hex(0xF1F5F9), Rgb::hex(0x1E293B)),
        ThemePreference::Light => (Rgb::hex(0x0F172A), Rgb::hex(0xF8FAFC)),
    };

    let width = PANEL_WIDTH.min(canvas.cols);
    let height = (lines.len() as u16 + 2).min(canvas.rows);
    let left = (canvas.cols - width) / 2;
    let top = (canvas.rows - height) / 2;

    for row in top..top + height {
        canvas.text(left, row, &" ".repeat(usize::from(width)), fg, bg);
    }
    for (i, line) in lines.iter().enumerate() {
        let row = top + 1 + i as u16;
        if row + 1 >= top + height {
            break;
        }
        let clipped: String = line.chars().take(usize::from(width.saturating_sub(4))).collect();
        canvas.text(left + 2, row, &clipped, fg, bg);
    }
}
