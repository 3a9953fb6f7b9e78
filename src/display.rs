/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.  The 800×500 logical canvas is scaled to
/// whatever cell grid the terminal currently offers.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use thiserror::Error;

use crate::entities::{Decoration, FrameId, GameState, GameStatus};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::Yellow;
const C_APPLE: Color = Color::Red;
const C_MESSAGE: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("no sprite registered for frame id '{0}'")]
    MissingSprite(FrameId),
}

// ── Sprite bank ───────────────────────────────────────────────────────────────

/// One terminal-cell sprite.
#[derive(Clone, Copy, Debug)]
pub struct Sprite {
    pub glyph: char,
    pub color: Color,
}

/// Asset provider: maps every frame id to its glyph.  Built once at startup
/// and cached; lookups never load anything twice.
pub struct SpriteBank {
    sprites: HashMap<FrameId, Sprite>,
}

impl SpriteBank {
    pub fn new() -> Self {
        let mut sprites = HashMap::new();
        let mut put = |id: FrameId, glyph: char| {
            sprites.insert(id, Sprite { glyph, color: Color::White });
        };

        put("player_stand", '☺');
        put("player_up_0", '▲');
        put("player_up_1", '△');
        put("player_down_0", '▼');
        put("player_down_1", '▽');
        put("player_left_0", '◀');
        put("player_left_1", '◁');
        put("player_right_0", '▶');
        put("player_right_1", '▷');

        Self { sprites }
    }

    pub fn get(&self, id: FrameId) -> Result<&Sprite, DisplayError> {
        self.sprites.get(id).ok_or(DisplayError::MissingSprite(id))
    }
}

impl Default for SpriteBank {
    fn default() -> Self {
        Self::new()
    }
}

// ── Coordinate scaling ────────────────────────────────────────────────────────

/// Map a canvas coordinate onto a cell index, clamped to the grid.
fn to_cell(value: f32, canvas_extent: f32, cells: u16) -> u16 {
    if cells == 0 {
        return 0;
    }
    let scaled = (value / canvas_extent * cells as f32) as i32;
    scaled.clamp(0, cells as i32 - 1) as u16
}

// ── HUD text sink ─────────────────────────────────────────────────────────────

/// The HUD line, regenerated by the frame loop only when the dirty flag is
/// set.
pub fn hud_line(state: &GameState) -> String {
    format!("score: {}    time: {}", state.score, state.time_left)
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.  Draw order matches the original: half the
/// decorations behind the player and apple, half in front.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    sprites: &SpriteBank,
    hud: &str,
) -> Result<(), DisplayError> {
    let (tw, th) = terminal::size()?;

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let split = state.decorations.len() / 2;
    for deco in &state.decorations[..split] {
        draw_decoration(out, state, deco, tw, th)?;
    }

    draw_player(out, state, sprites, tw, th)?;
    draw_apple(out, state, tw, th)?;

    for deco in &state.decorations[split..] {
        draw_decoration(out, state, deco, tw, th)?;
    }

    draw_message(out, state, tw, th)?;
    draw_hud(out, hud)?;
    draw_controls_hint(out, th)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, th.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    state: &GameState,
    sprites: &SpriteBank,
    tw: u16,
    th: u16,
) -> Result<(), DisplayError> {
    let sprite = sprites.get(state.player.sprite)?;
    let col = to_cell(state.player.x, state.width, tw);
    let row = to_cell(state.player.y, state.height, th);

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(sprite.color))?;
    out.queue(Print(sprite.glyph))?;
    Ok(())
}

fn draw_apple<W: Write>(
    out: &mut W,
    state: &GameState,
    tw: u16,
    th: u16,
) -> Result<(), DisplayError> {
    let col = to_cell(state.apple.x, state.width, tw);
    let row = to_cell(state.apple.y, state.height, th);

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_APPLE))?;
    out.queue(Print('●'))?;
    Ok(())
}

fn draw_decoration<W: Write>(
    out: &mut W,
    state: &GameState,
    deco: &Decoration,
    tw: u16,
    th: u16,
) -> Result<(), DisplayError> {
    // A rectangle above the canvas (freshly wrapped) has nothing visible yet.
    if deco.y < 0.0 {
        return Ok(());
    }

    let col = to_cell(deco.x, state.width, tw);
    let row = to_cell(deco.y, state.height, th);
    let w_cells = (to_cell(deco.width, state.width, tw)).max(1);
    let h_cells = (to_cell(deco.height, state.height, th)).max(1);

    let (r, g, b) = deco.color;
    out.queue(style::SetForegroundColor(Color::Rgb { r, g, b }))?;

    let line: String = "█".repeat(w_cells as usize);
    for dy in 0..h_cells {
        let y = row.saturating_add(dy);
        if y >= th {
            break;
        }
        out.queue(cursor::MoveTo(col, y))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_message<W: Write>(
    out: &mut W,
    state: &GameState,
    tw: u16,
    th: u16,
) -> Result<(), DisplayError> {
    let message = match state.status {
        GameStatus::Starting => "Press any key or touch to start",
        GameStatus::Ended => "Game ended",
        GameStatus::Running => return Ok(()),
    };

    let col = (tw / 2).saturating_sub(message.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, th / 2))?;
    out.queue(style::SetForegroundColor(C_MESSAGE))?;
    out.queue(Print(message))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, hud: &str) -> Result<(), DisplayError> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(hud))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, th: u16) -> Result<(), DisplayError> {
    out.queue(cursor::MoveTo(1, th.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← ↑ ↓ → : Move   Mouse drag : Steer   Q : Quit"))?;
    Ok(())
}
