//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, Piece};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Cell, SessionState, GRID_HEIGHT, GRID_WIDTH};

/// Side length of the next-piece preview box, in grid cells.
const PREVIEW_CELLS: u16 = 4;

/// Minimum panel width before the side panel is drawn at all.
const MIN_PANEL_W: u16 = 12;

const CONTROLS: [&str; 7] = [
    "<- -> move",
    "^  rotate",
    "v  soft drop",
    "SPC hard drop",
    "P  pause",
    "ENTER new game",
    "Q  quit",
];

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Grid cell width in terminal columns.
    cell_w: u16,
    /// Grid cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render a snapshot into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().glyph(' '));

        let frame_w = (GRID_WIDTH as u16).saturating_mul(self.cell_w).saturating_add(2);
        let frame_h = (GRID_HEIGHT as u16).saturating_mul(self.cell_h).saturating_add(2);

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        let border = CellStyle {
            fg: Rgb::new(200, 200, 200),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        };

        self.draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        // Locked cells with the falling piece on top.
        let preview = snap.preview();
        for (y, row) in preview.rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let px = offset(start_x + 1, x as u16, self.cell_w);
                let py = offset(start_y + 1, y as u16, self.cell_h);
                self.draw_grid_cell(fb, px, py, *cell);
            }
        }

        self.draw_side_panel(fb, snap, viewport, start_x, start_y, frame_w);

        match snap.state {
            SessionState::Idle => {
                self.draw_overlay(fb, start_x, start_y, frame_w, frame_h, &[("PRESS ENTER", None)]);
            }
            SessionState::Paused => {
                self.draw_overlay(fb, start_x, start_y, frame_w, frame_h, &[("PAUSED", None)]);
            }
            SessionState::GameOver => {
                self.draw_overlay(
                    fb,
                    start_x,
                    start_y,
                    frame_w,
                    frame_h,
                    &[
                        ("GAME OVER", None),
                        ("SCORE ", Some(snap.score)),
                        ("LINES ", Some(snap.lines)),
                    ],
                );
            }
            SessionState::Playing => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    /// Draw one grid cell whose top-left terminal position is `(px, py)`.
    fn draw_grid_cell(&self, fb: &mut FrameBuffer, px: u16, py: u16, cell: Cell) {
        let bg = Rgb::new(30, 30, 40);
        let (ch, style) = match cell {
            Cell::Filled(color) => (
                '█',
                CellStyle {
                    fg: color.into(),
                    bg,
                    bold: true,
                    dim: false,
                },
            ),
            Cell::Empty => (
                '·',
                CellStyle {
                    fg: Rgb::new(90, 90, 100),
                    bg,
                    bold: false,
                    dim: true,
                },
            ),
        };
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < MIN_PANEL_W {
            return;
        }

        let label = CellStyle {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        let value = CellStyle {
            fg: Rgb::new(200, 200, 200),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        };

        let mut y = start_y;
        fb.put_str(panel_x, y, "NEXT", label);
        y = y.saturating_add(1);
        self.draw_next_piece(fb, panel_x, y, snap.next.as_ref());
        y = offset(y, PREVIEW_CELLS, self.cell_h).saturating_add(1);

        for (name, amount) in [("SCORE", snap.score), ("LEVEL", snap.level), ("LINES", snap.lines)] {
            fb.put_str(panel_x, y, name, label);
            y = y.saturating_add(1);
            fb.put_u32(panel_x, y, amount, value);
            y = y.saturating_add(2);
        }

        // Controls help only when it fits entirely.
        let help_h = CONTROLS.len() as u16 + 1;
        if y.saturating_add(help_h) > viewport.height {
            return;
        }
        let dim = CellStyle { dim: true, ..value };
        fb.put_str(panel_x, y, "CONTROLS", label);
        for line in CONTROLS {
            y = y.saturating_add(1);
            fb.put_str(panel_x, y, line, dim);
        }
    }

    /// Draw the next piece centered in a 4x4 box.
    fn draw_next_piece(&self, fb: &mut FrameBuffer, x: u16, y: u16, next: Option<&Piece>) {
        let box_style = CellStyle {
            fg: Rgb::new(60, 60, 70),
            bg: Rgb::new(20, 20, 28),
            bold: false,
            dim: true,
        };
        fb.fill_rect(
            x,
            y,
            PREVIEW_CELLS.saturating_mul(self.cell_w),
            PREVIEW_CELLS.saturating_mul(self.cell_h),
            ' ',
            box_style,
        );

        let Some(piece) = next else {
            return;
        };
        let row_off = PREVIEW_CELLS.saturating_sub(piece.shape.rows() as u16) / 2;
        let col_off = PREVIEW_CELLS.saturating_sub(piece.shape.cols() as u16) / 2;
        let style = CellStyle {
            fg: piece.color.into(),
            bg: box_style.bg,
            bold: true,
            dim: false,
        };
        for (r, c) in piece.shape.cells() {
            let px = offset(x, col_off + c as u16, self.cell_w);
            let py = offset(y, row_off + r as u16, self.cell_h);
            fb.fill_rect(px, py, self.cell_w, self.cell_h, '█', style);
        }
    }

    /// Centered lines of text, each an optional number after its label.
    fn draw_overlay(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        lines: &[(&str, Option<u32>)],
    ) {
        let style = CellStyle {
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        let top = start_y.saturating_add(frame_h / 2).saturating_sub(lines.len() as u16 / 2);

        for (i, (text, number)) in lines.iter().enumerate() {
            let y = top.saturating_add(i as u16);
            let text_w = text.chars().count() as u16 + number.map_or(0, digit_count);
            let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
            fb.put_str(x, y, text, style);
            if let Some(n) = number {
                fb.put_u32(x.saturating_add(text.chars().count() as u16), y, *n, style);
            }
        }
    }
}

/// Terminal coordinate of the `index`-th cell of size `size` after `origin`.
fn offset(origin: u16, index: u16, size: u16) -> u16 {
    origin.saturating_add(index.saturating_mul(size))
}

fn digit_count(n: u32) -> u16 {
    n.checked_ilog10().map_or(1, |d| d as u16 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_count_matches_decimal_width() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(123_456), 6);
    }

    #[test]
    fn huge_cell_size_saturates_instead_of_overflowing() {
        let view = GameView::new(u16::MAX, u16::MAX);
        let mut snap = GameSnapshot::default();
        snap.grid.set(19, 9, Cell::Filled(crate::types::Color::Red)).unwrap();
        let fb = view.render(&snap, Viewport::new(40, 30));
        assert_eq!((fb.width(), fb.height()), (40, 30));
        assert_eq!(fb.get(0, 0).map(|g| g.ch), Some('┌'));
        assert_eq!(offset(10, 3, u16::MAX), u16::MAX);
    }

    #[test]
    fn degenerate_cell_size_is_clamped() {
        let view = GameView::new(0, 0);
        let fb = view.render(&GameSnapshot::default(), Viewport::new(12, 22));
        assert_eq!(fb.get(0, 0).map(|g| g.ch), Some('┌'));
        assert_eq!(fb.get(11, 21).map(|g| g.ch), Some('┘'));
    }
}
