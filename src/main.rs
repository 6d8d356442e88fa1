//! Terminal runner (default binary).
//!
//! Owns the session and wires the collaborators together: crossterm key events
//! become session commands, a gravity timer drives ticks, and every frame is
//! rendered from a fresh snapshot.

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};

use blockfall::core::{GameSession, GravityTimer};
use blockfall::input::{handle_key_event, should_quit};
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use blockfall::types::GameAction;

/// Frame budget when no input arrives.
const FRAME_MS: u64 = 16;

#[derive(Debug, Parser)]
#[command(name = "blockfall", version, about = "Falling-block puzzle game for the terminal")]
struct Args {
    /// Seed for the piece sequence (random when absent)
    #[arg(long, env = "BLOCKFALL_SEED")]
    seed: Option<u64>,

    /// Write logs to this file; filtered by RUST_LOG (default: info)
    #[arg(long, env = "BLOCKFALL_LOG")]
    log_file: Option<PathBuf>,

    /// Start playing immediately instead of waiting for Enter
    #[arg(long)]
    autostart: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("starting with seed {}", seed);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, seed, args.autostart);

    // Always try to restore terminal state.
    if let Err(err) = term.exit() {
        log::error!("failed to restore terminal: {err:#}");
    }
    result
}

/// The terminal is in raw alternate-screen mode, so logs only go to a file.
fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("initializing logger")?;
    Ok(())
}

fn run(term: &mut TerminalRenderer, seed: u64, autostart: bool) -> Result<()> {
    let mut session = GameSession::new(seed);
    if autostart {
        session.apply_action(GameAction::Start);
    }

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut gravity = GravityTimer::new();
    let frame = Duration::from_millis(FRAME_MS);
    let mut last_frame = Instant::now();

    loop {
        let snapshot = session.snapshot();
        gravity.sync(&snapshot);

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snapshot, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Wait for input, but never past the next gravity tick.
        let until_tick = gravity
            .remaining_ms()
            .map_or(frame, |ms| Duration::from_millis(ms as u64));
        let timeout = frame.min(until_tick);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        log::info!("quit requested");
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        session.apply_action(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Sync again so an interval change from this input re-arms before advancing.
        gravity.sync(&session.snapshot());
        let elapsed = last_frame.elapsed();
        last_frame = Instant::now();
        let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
        if gravity.advance(elapsed_ms) {
            session.tick();
        }

        if let Some(event) = session.take_last_event() {
            if event.lines_cleared > 0 {
                log::debug!(
                    "cleared {} lines for {} points",
                    event.lines_cleared,
                    event.points
                );
            }
        }
    }
}
