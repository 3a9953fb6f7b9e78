/// All game entity types — pure data, no logic.

/// Round lifecycle.  `Starting` is the initial phase; the first key press or
/// touch starts the round; `Ended` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Starting,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Standing,
}

/// Sprite identifier inside a direction's animation sequence.
pub type FrameId = &'static str;

impl Direction {
    /// The ordered animation sequence for this direction.  Standing has a
    /// single frame; every walking direction alternates between two.
    pub fn frame_set(self) -> &'static [FrameId] {
        match self {
            Direction::Standing => &["player_stand"],
            Direction::Up => &["player_up_0", "player_up_1"],
            Direction::Down => &["player_down_0", "player_down_1"],
            Direction::Left => &["player_left_0", "player_left_1"],
            Direction::Right => &["player_right_0", "player_right_1"],
        }
    }
}

/// A point in canvas-local coordinates (fractional units allowed).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An in-progress touch drag.  `last` is the most recent touch point;
/// `delta` is the reverse vector of the latest finger displacement
/// (`previous - current`).  Both live and die together: the game state holds
/// an `Option<TouchDrag>` that is set on touch-start and cleared on
/// touch-end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchDrag {
    pub last: Point,
    pub delta: Point,
}

/// A keyboard key as the game cares about it.  Everything that is not an
/// arrow key collapses to `Other`, which maps to `Standing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Left,
    Right,
    Up,
    Down,
    Other,
}

/// One raw input event.  The frame loop drains a queue of these at the start
/// of every tick, so event ordering is deterministic and testable without a
/// live terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyInput),
    KeyUp,
    TouchStart(Point),
    TouchMove(Point),
    TouchEnd,
}

// ── Entities ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    /// Position in canvas units; fractional values accumulate.
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    /// Index into the current direction's frame sequence.  Only read after
    /// being wrapped modulo the sequence length, so it may transiently
    /// exceed a shorter sequence after a direction change.
    pub frame: usize,
    /// The sprite currently on screen; swapped only when the countdown fires.
    pub sprite: FrameId,
    /// Ticks remaining before the next frame advance.
    pub animation_ticks: u32,
    pub default_animation_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct Apple {
    pub x: f32,
    pub y: f32,
    /// Square hit radius: the player overlaps when both coordinate
    /// differences are strictly below this.
    pub size: f32,
}

/// A decorative falling rectangle.  `x`, dimensions, color and speed are
/// fixed at creation; only `y` ever changes, wrapping back above the canvas
/// once it falls past the bottom.
#[derive(Clone, Debug)]
pub struct Decoration {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: (u8, u8, u8),
    pub speed: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can return a
/// new copy without mutating the original.  One mutable copy is alive at a
/// time, owned by the frame loop.
#[derive(Clone, Debug)]
pub struct GameState {
    pub status: GameStatus,
    /// Active touch drag, if a finger (or mouse button) is down.
    pub touch: Option<TouchDrag>,
    pub player: Player,
    pub apple: Apple,
    pub decorations: Vec<Decoration>,
    pub score: u32,
    /// Remaining seconds as displayed in the HUD.
    pub time_left: i64,
    /// Absolute end-of-round timestamp, set once at Starting → Running.
    pub end_time: Option<f64>,
    /// Set whenever score or displayed time changes; the frame loop clears
    /// it after refreshing the HUD text.
    pub hud_dirty: bool,
    /// Logical canvas size; bounds for apple respawn and decoration wrap.
    pub width: f32,
    pub height: f32,
    /// Player movement in canvas units per tick.
    pub speed: f32,
}
