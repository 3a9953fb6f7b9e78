use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
    ExecutableCommand,
};
use rand::thread_rng;

use apple_dash::compute::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use apple_dash::display::{self, SpriteBank};
use apple_dash::entities::{GameState, InputEvent, KeyInput, Point};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Without key-release reporting (classic terminals), a direction key whose
/// press/repeat events stop arriving for this many frames is treated as
/// released.  The OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames
/// (≈133 ms) is always refreshed while the key is actually held.
const HOLD_WINDOW: u64 = 4;

// ── Event translation ─────────────────────────────────────────────────────────

fn translate_key(code: KeyCode) -> KeyInput {
    match code {
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        _ => KeyInput::Other,
    }
}

/// Scale a terminal cell position to canvas-local coordinates.  This is the
/// touch channel: mouse press/drag/release stand in for finger
/// start/move/end.
fn cell_to_canvas(col: u16, row: u16, tw: u16, th: u16) -> Point {
    let x = col as f32 / tw.max(1) as f32 * CANVAS_WIDTH;
    let y = row as f32 / th.max(1) as f32 * CANVAS_HEIGHT;
    Point::new(x, y)
}

fn translate_mouse(mouse: MouseEvent, tw: u16, th: u16) -> Option<InputEvent> {
    let point = cell_to_canvas(mouse.column, mouse.row, tw, th);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::TouchStart(point)),
        MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::TouchMove(point)),
        MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::TouchEnd),
        _ => None,
    }
}

// ── Fault-isolation boundary ──────────────────────────────────────────────────

/// Fold one event into the state; a bad event is logged and dropped so it
/// can never corrupt or halt the loop.
fn apply_or_skip(state: &mut GameState, event: InputEvent, now: f64) {
    match compute::apply_input(state, &event, now) {
        Ok(next) => *state = next,
        Err(err) => log::warn!("input event {event:?} skipped: {err}"),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut rng = thread_rng();
    let sprites = SpriteBank::new();
    let start = Instant::now();

    let (mut tw, mut th) = terminal::size()?;
    let mut hud = display::hud_line(state);
    state.hud_dirty = false;

    // Frame number of the last direction-key press/repeat, for terminals
    // that never report releases.
    let mut key_last_seen: Option<u64> = None;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        let now = start.elapsed().as_secs_f64();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c')
                                if modifiers.contains(KeyModifiers::CONTROL) =>
                            {
                                return Ok(());
                            }
                            _ => {}
                        }
                        key_last_seen = Some(frame);
                        apply_or_skip(state, InputEvent::KeyDown(translate_key(code)), now);
                    }
                    KeyEventKind::Release => {
                        key_last_seen = None;
                        apply_or_skip(state, InputEvent::KeyUp, now);
                    }
                },
                Event::Mouse(mouse) => {
                    if let Some(touch) = translate_mouse(mouse, tw, th) {
                        apply_or_skip(state, touch, now);
                    }
                }
                Event::Resize(w, h) => {
                    tw = w;
                    th = h;
                }
                _ => {}
            }
        }

        // Synthesize the key-up when the repeat stream has gone quiet.
        if let Some(last) = key_last_seen {
            if frame.saturating_sub(last) > HOLD_WINDOW {
                key_last_seen = None;
                apply_or_skip(state, InputEvent::KeyUp, now);
            }
        }

        *state = compute::update(state, now, &mut rng);
        *state = compute::advance_animation(state);

        if state.hud_dirty {
            hud = display::hud_line(state);
            state.hud_dirty = false;
        }

        if let Err(err) = display::render(out, state, &sprites, &hud) {
            log::error!("render failed, frame skipped: {err}");
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release events from the terminal.  Ghostty / kitty-protocol
    // terminals support this; others fall back to the hold-window heuristic.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break; // receiver dropped → program exiting
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut rng = thread_rng();
    let mut state = compute::init_state(CANVAS_WIDTH, CANVAS_HEIGHT, &mut rng);
    let result = game_loop(&mut out, &mut state, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
