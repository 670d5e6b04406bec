//! Plain-text output for the one-shot commands.

use chrono::NaiveTime;
use weatherly_core::{
    Forecast, ThemeResult, UnitSystem, WeatherController, WeatherSnapshot,
    units::{
        convert_temperature, convert_wind_speed, dew_point, temperature_symbol, wind_direction,
        wind_speed_symbol,
    },
};

const BAR_WIDTH: usize = 20;

/// Everything `show` prints.
pub fn report(
    controller: &WeatherController,
    temperature_units: UnitSystem,
    wind_units: UnitSystem,
    clock: NaiveTime,
) -> String {
    let Some(snapshot) = controller.snapshot() else {
        return String::new();
    };

    let mut out = current(
        snapshot,
        controller.theme(),
        controller.sun_progress(clock),
        temperature_units,
        wind_units,
    );
    if let Some(forecast) = controller.forecast() {
        out.push('\n');
        out.push_str(&forecast_table(forecast, temperature_units, wind_units));
    }
    out
}

pub fn current(
    snapshot: &WeatherSnapshot,
    theme: Option<&ThemeResult>,
    sun_pct: Option<f64>,
    temperature_units: UnitSystem,
    wind_units: UnitSystem,
) -> String {
    let temp = |c: f64| format_temperature(c, temperature_units);
    let t = &snapshot.temperature;
    let d = &snapshot.details;
    let mut lines = vec![
        format!("{}, {}", snapshot.city, snapshot.country),
        format!("{} ({})", snapshot.weather.main, snapshot.weather.description),
        String::new(),
        format!(
            "Temperature  {}  feels like {}  (low {}, high {})",
            temp(t.current),
            temp(t.feels_like),
            temp(t.min),
            temp(t.max)
        ),
        format!(
            "Humidity     {}%  dew point {}",
            d.humidity,
            temp(dew_point(t.current, d.humidity))
        ),
        format!(
            "Wind         {:.1} {} {}",
            convert_wind_speed(d.wind_speed, wind_units),
            wind_speed_symbol(wind_units),
            wind_direction(d.wind_direction)
        ),
        format!("Pressure     {:.0} hPa", d.pressure),
        format!("Visibility   {:.1} km", d.visibility),
        format!("Clouds       {}%", d.clouds),
    ];

    let sun = &snapshot.sun;
    let mut sun_line =
        format!("Sun          {} - {}", sun.sunrise.format("%H:%M"), sun.sunset.format("%H:%M"));
    if let Some(pct) = sun_pct {
        sun_line.push_str(&format!("  {} {pct:.0}%", progress_bar(pct, BAR_WIDTH)));
    }
    lines.push(sun_line);

    if let Some(theme) = theme {
        lines.push(format!(
            "Theme        {} / {} / {}",
            theme.time_of_day, theme.category, theme.intensity
        ));
        lines.push(format!("Background   {}", theme.gradient.to_css()));
        if let Some(special) = theme.special {
            let name = format!("{special:?}").to_lowercase();
            lines.push(format!("Sky          {name}"));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Standalone forecast, as printed by `forecast`.
pub fn forecast(forecast: &Forecast, temperature_units: UnitSystem, wind_units: UnitSystem) -> String {
    let mut out = format!("{}, {}\n", forecast.city, forecast.country);
    out.push_str(&forecast_table(forecast, temperature_units, wind_units));
    out
}

fn forecast_table(forecast: &Forecast, temperature_units: UnitSystem, wind_units: UnitSystem) -> String {
    if forecast.entries.is_empty() {
        return "No forecast available.\n".to_string();
    }

    let mut out = String::from("Forecast\n");
    for entry in &forecast.entries {
        let mut line = format!(
            "  {:<3} {}  {:<14} {:>7} / {:<7}  {:.1} {}  {}%",
            short_day(&entry.day),
            entry.date.format("%d %b"),
            entry.weather.main,
            format_temperature(entry.temperature.min, temperature_units),
            format_temperature(entry.temperature.max, temperature_units),
            convert_wind_speed(entry.details.wind_speed, wind_units),
            wind_speed_symbol(wind_units),
            entry.details.humidity,
        );
        if entry.details.rain > 0.0 {
            line.push_str(&format!("  rain {:.1} mm", entry.details.rain));
        }
        if entry.details.snow > 0.0 {
            line.push_str(&format!("  snow {:.1} mm", entry.details.snow));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn short_day(day: &str) -> &str {
    day.char_indices().nth(3).map_or(day, |(i, _)| &day[..i])
}

pub fn format_temperature(celsius: f64, units: UnitSystem) -> String {
    format!("{:.0}{}", convert_temperature(celsius, units), temperature_symbol(units))
}

/// `[#####-----]` style bar for a percentage.
pub fn progress_bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
