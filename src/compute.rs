/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, the current time and an RNG handle) and
/// returns a brand-new `GameState`.  Side effects are limited to the
/// injected RNG, so a seeded `StdRng` makes every transition deterministic.

use rand::Rng;
use thiserror::Error;

use crate::entities::{
    Apple, Decoration, Direction, GameState, GameStatus, InputEvent, KeyInput, Player, Point,
    TouchDrag,
};

// ── Tuning constants ──────────────────────────────────────────────────────────

/// Logical canvas size; the terminal renderer scales to fit.
pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 500.0;

/// Round length in seconds, added to `now` when the round starts.
pub const ROUND_SECONDS: f64 = 60.0;

/// Player movement per tick, in canvas units.
pub const PLAYER_SPEED: f32 = 1.0;

/// Square hit radius of the apple.
pub const APPLE_SIZE: f32 = 64.0;

/// Number of decorative falling rectangles.
pub const DECORATION_COUNT: usize = 40;

/// A decoration that falls past the bottom re-enters just above the top.
pub const DECORATION_RESET_Y: f32 = -10.0;

/// Ticks between sprite frame advances.
pub const DEFAULT_ANIMATION_TICKS: u32 = 20;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Transient per-tick faults.  None of these are fatal: the frame loop logs
/// them and treats the offending event or tick as a no-op.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("touch move arrived with no active touch")]
    TouchNotActive,
}

// ── Constructors ──────────────────────────────────────────────────────────────

fn init_player(width: f32, height: f32) -> Player {
    let frames = Direction::Standing.frame_set();
    Player {
        x: width / 2.0,
        y: height / 2.0,
        direction: Direction::Standing,
        frame: 0,
        sprite: frames[0],
        animation_ticks: DEFAULT_ANIMATION_TICKS,
        default_animation_ticks: DEFAULT_ANIMATION_TICKS,
    }
}

fn init_apple(width: f32, height: f32, rng: &mut impl Rng) -> Apple {
    Apple {
        x: rng.gen_range(0.0..=width),
        y: rng.gen_range(0.0..=height),
        size: APPLE_SIZE,
    }
}

fn init_decorations(width: f32, height: f32, rng: &mut impl Rng) -> Vec<Decoration> {
    (0..DECORATION_COUNT)
        .map(|_| Decoration {
            x: rng.gen_range(0.0..=width),
            y: rng.gen_range(0.0..=height),
            width: rng.gen_range(0.0..=100.0),
            height: rng.gen_range(0.0..=100.0),
            color: (rng.gen(), rng.gen(), rng.gen()),
            speed: rng.gen_range(1..=6) as f32,
        })
        .collect()
}

/// Build the initial game state for a given logical canvas size.
pub fn init_state(width: f32, height: f32, rng: &mut impl Rng) -> GameState {
    GameState {
        status: GameStatus::Starting,
        touch: None,
        player: init_player(width, height),
        apple: init_apple(width, height, rng),
        decorations: init_decorations(width, height, rng),
        score: 0,
        time_left: ROUND_SECONDS as i64,
        end_time: None,
        hud_dirty: true,
        width,
        height,
        speed: PLAYER_SPEED,
    }
}

// ── Input application (pure) ──────────────────────────────────────────────────

/// Starting → Running: fix the absolute end-of-round timestamp.
fn start_round(state: &GameState, now: f64) -> GameState {
    GameState {
        status: GameStatus::Running,
        end_time: Some(now + ROUND_SECONDS),
        ..state.clone()
    }
}

/// Fold one input event into the state.
///
/// Any key press starts the round; a touch-start only records the drag and
/// leaves the Starting → Running transition to the next `update`, matching
/// the original's split between the two channels.
pub fn apply_input(
    state: &GameState,
    event: &InputEvent,
    now: f64,
) -> Result<GameState, GameError> {
    let mut next = state.clone();

    match event {
        InputEvent::KeyDown(key) => {
            if next.status == GameStatus::Starting {
                next = start_round(&next, now);
            }
            next.player.direction = match key {
                KeyInput::Left => Direction::Left,
                KeyInput::Right => Direction::Right,
                KeyInput::Up => Direction::Up,
                KeyInput::Down => Direction::Down,
                KeyInput::Other => Direction::Standing,
            };
        }
        InputEvent::KeyUp => {
            next.player.direction = Direction::Standing;
        }
        InputEvent::TouchStart(point) => {
            next.touch = Some(TouchDrag {
                last: *point,
                delta: Point::new(0.0, 0.0),
            });
        }
        InputEvent::TouchMove(point) => {
            let drag = next.touch.ok_or(GameError::TouchNotActive)?;
            // Reverse vector of the finger displacement, on purpose.
            next.touch = Some(TouchDrag {
                last: *point,
                delta: Point::new(drag.last.x - point.x, drag.last.y - point.y),
            });
        }
        InputEvent::TouchEnd => {
            next.touch = None;
            next.player.direction = Direction::Standing;
        }
    }

    Ok(next)
}

/// Derive a direction from the stored drag delta.  The sign convention is
/// inherited from the original game and kept as-is: a leftward finger
/// displacement (dx > 0 in reverse-vector terms) selects `Left`.
pub fn resolve_touch_direction(drag: &TouchDrag) -> Direction {
    let dx = drag.delta.x;
    let dy = drag.delta.y;
    if dx.abs() >= dy.abs() {
        if dx < 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

// ── Per-tick update (pure — RNG is injected) ─────────────────────────────────

/// Coarse center-distance overlap test, reproduced from the original game:
/// the apple counts as a square of side `2 * size` around its draw position.
pub fn overlaps(player: &Player, apple: &Apple) -> bool {
    (player.x - apple.x).abs() < apple.size && (player.y - apple.y).abs() < apple.size
}

/// While the round runs, keep the displayed remaining seconds in sync and
/// flag the HUD when the integer value changes; once `now` reaches the end
/// timestamp, the round ends for good.
fn update_clock(state: &GameState, now: f64) -> GameState {
    let mut next = state.clone();
    let Some(end_time) = next.end_time else {
        return next;
    };

    if now < end_time {
        let remaining = (end_time - now) as i64;
        if remaining != next.time_left {
            next.time_left = remaining;
            next.hud_dirty = true;
        }
    } else {
        next.status = GameStatus::Ended;
    }
    next
}

/// Resolve the player's direction (an active touch drag overrides whatever
/// the keyboard last set) and advance the position one step along it.
fn update_player(state: &GameState) -> GameState {
    let mut next = state.clone();

    if let Some(drag) = next.touch {
        next.player.direction = resolve_touch_direction(&drag);
    }

    match next.player.direction {
        Direction::Down => next.player.y += next.speed,
        Direction::Up => next.player.y -= next.speed,
        Direction::Right => next.player.x += next.speed,
        Direction::Left => next.player.x -= next.speed,
        Direction::Standing => {}
    }
    next
}

/// Advance the simulation by one tick.
///
/// Player, clock and score-freezing follow the round phase, but the apple
/// pickup and the decoration fall run in every phase — including after the
/// round has ended.  The original game behaves this way (background
/// animation keeps going on the end screen) and it is kept deliberately.
pub fn update(state: &GameState, now: f64, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();

    match next.status {
        GameStatus::Starting => {
            if next.touch.is_some() {
                next = start_round(&next, now);
            }
        }
        GameStatus::Running => {
            next = update_clock(&next, now);
            // A tick that crosses the end timestamp skips the player step.
            if next.status == GameStatus::Running {
                next = update_player(&next);
            }
        }
        GameStatus::Ended => {}
    }

    if overlaps(&next.player, &next.apple) {
        next.apple.x = rng.gen_range(0.0..=next.width);
        next.apple.y = rng.gen_range(0.0..=next.height);
        next.score += 1;
        next.hud_dirty = true;
    }

    for deco in &mut next.decorations {
        deco.y += deco.speed;
        if deco.y > next.height {
            deco.y = DECORATION_RESET_Y;
        }
    }

    next
}

// ── Animation (driven once per rendered frame) ───────────────────────────────

/// Tick the player's animation countdown; when it fires, reset it and step
/// the frame index modulo the current direction's sequence length.
///
/// Direction changes never reset the index — only which sequence it indexes.
/// The index is wrapped at advance time, so a stale index from a longer
/// sequence is harmless.
pub fn advance_animation(state: &GameState) -> GameState {
    let mut next = state.clone();
    let player = &mut next.player;

    player.animation_ticks = player.animation_ticks.saturating_sub(1);
    if player.animation_ticks == 0 {
        player.animation_ticks = player.default_animation_ticks;

        let frames = player.direction.frame_set();
        player.frame = (player.frame + 1) % frames.len();
        player.sprite = frames[player.frame];
    }
    next
}
