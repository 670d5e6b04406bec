//! The animated `watch` view.
//!
//! Everything runs on one task: a `select!` over the frame interval, the
//! one-second clock, and outcomes of fetches spawned in the background.

use anyhow::Result;
use chrono::Local;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Stdout, Write},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    sync::mpsc::{self, UnboundedSender},
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info};
use weatherly_core::{
    AnimationEngine, FetchTicket, LoadOutcome, Preferences, Query, ThemeEngine, WeatherController,
    WeatherProvider, load_weather, theme::Rgb,
};

use crate::draw::{self, Canvas, Overlay};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

type FetchResult = (FetchTicket, LoadOutcome);

/// Restores the terminal on drop, including on early return.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
        Ok(Self { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, EnableLineWrap, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Search(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    controller: WeatherController,
    canvas: Canvas,
    mode: Mode,
    fetches: UnboundedSender<FetchResult>,
}

impl App {
    fn spawn(&self, ticket: Option<FetchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let provider = self.controller.provider();
        let tx = self.fetches.clone();
        debug!(generation = ticket.generation(), query = %ticket.query(), "spawning fetch");

        tokio::spawn(async move {
            let outcome = load_weather(provider.as_ref(), ticket.query()).await;
            // The view may have quit already.
            let _ = tx.send((ticket, outcome));
        });
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas.resize(cols, rows);
        let bounds = draw::bounds_for(cols, rows);
        self.controller.resize(bounds.width, bounds.height);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        if let Mode::Search(input) = &mut self.mode {
            match key.code {
                KeyCode::Esc => self.mode = Mode::Normal,
                KeyCode::Enter => {
                    let city = std::mem::take(input);
                    self.mode = Mode::Normal;
                    let ticket = self.controller.search(&city);
                    self.spawn(ticket);
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return Flow::Continue;
        }

        let prefs = self.controller.prefs().clone();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('r') => {
                let ticket = self.controller.retry();
                self.spawn(ticket);
            }
            KeyCode::Char('/') => self.mode = Mode::Search(String::new()),
            KeyCode::Char('l') => {
                let coords = self.controller.snapshot().map(|s| s.coordinates);
                if let Some(c) = coords {
                    let ticket = self.controller.locate(c.latitude, c.longitude);
                    self.spawn(Some(ticket));
                }
            }
            KeyCode::Char('t') => {
                self.controller.toggle_theme();
            }
            KeyCode::Char('u') => {
                self.controller.set_temperature_unit(prefs.units.temperature.toggled());
            }
            KeyCode::Char('w') => self.controller.set_wind_unit(prefs.units.wind.toggled()),
            KeyCode::Char('a') => self.controller.set_animations(!prefs.settings.animations),
            _ => {}
        }
        Flow::Continue
    }

    /// Drain pending terminal events without blocking.
    fn poll_input(&mut self) -> io::Result<Flow> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if self.handle_key(key) == Flow::Quit {
                        return Ok(Flow::Quit);
                    }
                }
                Event::Resize(cols, rows) => self.resize(cols, rows),
                _ => {}
            }
        }
        Ok(Flow::Continue)
    }
}

fn overlay(mode: &Mode, phase: f64) -> Overlay<'_> {
    let search = match mode {
        Mode::Search(input) => Some(input.as_str()),
        Mode::Normal => None,
    };
    Overlay { search, phase }
}

pub async fn run(
    provider: Arc<dyn WeatherProvider>,
    prefs: Preferences,
    path: PathBuf,
    query: Query,
    seed: Option<u64>,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let bounds = draw::bounds_for(cols, rows);

    let mut controller = WeatherController::new(provider, prefs, bounds).with_prefs_path(path);
    if let Some(seed) = seed {
        controller = controller
            .with_theme_engine(ThemeEngine::with_seed(seed))
            .with_animation(AnimationEngine::with_seed(bounds, seed));
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<FetchResult>();
    let mut app = App { controller, canvas: Canvas::new(cols, rows), mode: Mode::Normal, fetches: tx };

    let first = match &query {
        Query::City(city) => app.controller.search(city),
        Query::Coords { lat, lon } => Some(app.controller.locate(*lat, *lon)),
    };
    app.spawn(first);
    info!(%query, cols, rows, "watch view opened");

    let mut guard = TerminalGuard::enter()?;
    let opened = Instant::now();
    let mut last_frame = opened;

    let mut frames = interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock = interval(CLOCK_INTERVAL);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f64();
                last_frame = now;

                if app.poll_input()? == Flow::Quit {
                    break;
                }
                app.controller.frame(dt);

                let phase = now.duration_since(opened).as_secs_f64();
                let view = overlay(&app.mode, phase);
                draw::scene(&mut app.canvas, &app.controller, Local::now().time(), view);
                flush(&mut guard.out, &app.canvas)?;
            }
            _ = clock.tick() => {
                app.controller.tick_clock(Local::now().time());
                let ticket = app.controller.poll_refresh(Instant::now());
                app.spawn(ticket);
            }
            Some((ticket, outcome)) = rx.recv() => {
                app.controller.complete(ticket, outcome, Instant::now(), Local::now().time());
            }
        }
    }

    info!("watch view closed");
    drop(guard);
    Ok(())
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

/// Write the canvas, emitting colour changes only where they differ.
fn flush(out: &mut impl Write, canvas: &Canvas) -> io::Result<()> {
    queue!(out, BeginSynchronizedUpdate)?;
    for row in 0..canvas.rows() {
        queue!(out, cursor::MoveTo(0, row))?;
        let mut current: Option<(Rgb, Rgb)> = None;
        for cell in canvas.row(row) {
            if current != Some((cell.fg, cell.bg)) {
                queue!(out, SetForegroundColor(color(cell.fg)), SetBackgroundColor(color(cell.bg)))?;
                current = Some((cell.fg, cell.bg));
            }
            queue!(out, Print(cell.ch))?;
        }
    }
    queue!(out, EndSynchronizedUpdate)?;
    out.flush()
}
