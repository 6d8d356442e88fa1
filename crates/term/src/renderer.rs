//! TerminalRenderer: flushes framebuffers to a real terminal.
//!
//! Frames are compared row by row. A changed row is resent as one span from its
//! first to its last differing glyph; unchanged rows cost nothing. The first
//! frame, a resize and [`TerminalRenderer::invalidate`] force a full redraw.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Colors, Print, ResetColor, SetAttribute, SetColors},
    terminal,
};

use crate::fb::{CellStyle, FrameBuffer, Glyph, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    /// Frame currently on screen; `None` forces a full redraw.
    shown: Option<FrameBuffer>,
    bytes: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            shown: None,
            bytes: Vec::with_capacity(16 * 1024),
        }
    }

    /// Switch to raw mode on the alternate screen with the cursor hidden.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.bytes.clear();
        queue!(
            self.bytes,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap
        )?;
        self.flush()?;
        self.shown = None;
        Ok(())
    }

    /// Undo [`enter`](Self::enter); safe to call after a failed frame.
    pub fn exit(&mut self) -> Result<()> {
        self.bytes.clear();
        queue!(
            self.bytes,
            SetAttribute(Attribute::Reset),
            ResetColor,
            terminal::EnableLineWrap,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw, e.g. after a resize.
    pub fn invalidate(&mut self) {
        self.shown = None;
    }

    /// Draw `fb`, then hand back the previously shown frame in its place.
    ///
    /// Callers keep one framebuffer and render into it every frame; the two
    /// buffers trade places so nothing is cloned.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.bytes.clear();
        match self.shown.take() {
            Some(mut shown) => {
                encode_diff_into(&shown, fb, &mut self.bytes)?;
                std::mem::swap(&mut shown, fb);
                self.shown = Some(shown);
            }
            None => {
                encode_full_into(fb, &mut self.bytes)?;
                let blank = FrameBuffer::new(fb.width(), fb.height());
                self.shown = Some(std::mem::replace(fb, blank));
            }
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.write_all(&self.bytes)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a clear screen followed by every row of `fb`.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    queue!(out, terminal::Clear(terminal::ClearType::All))?;
    let mut spans = SpanWriter::new(out);
    for y in 0..fb.height() {
        if let Some(row) = fb.row(y) {
            spans.write(0, y, row)?;
        }
    }
    spans.finish()
}

/// Encode only what changed between `prev` and `next`.
///
/// Falls back to a full redraw when the sizes differ.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        return encode_full_into(next, out);
    }

    let mut spans = SpanWriter::new(out);
    for y in 0..next.height() {
        let (Some(old), Some(new)) = (prev.row(y), next.row(y)) else {
            continue;
        };
        if let Some((first, last)) = changed_span(old, new) {
            spans.write(first as u16, y, &new[first..=last])?;
        }
    }
    spans.finish()
}

/// Index of the first and last differing glyph of two equally long rows.
fn changed_span(old: &[Glyph], new: &[Glyph]) -> Option<(usize, usize)> {
    let differs = |(a, b): (&Glyph, &Glyph)| a != b;
    let first = old.iter().zip(new).position(differs)?;
    let last = old.iter().zip(new).rposition(differs)?;
    Some((first, last))
}

/// Writes glyph spans, emitting style escapes only when the style changes.
struct SpanWriter<'a> {
    out: &'a mut Vec<u8>,
    style: Option<CellStyle>,
}

impl<'a> SpanWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, style: None }
    }

    fn write(&mut self, x: u16, y: u16, glyphs: &[Glyph]) -> Result<()> {
        queue!(self.out, cursor::MoveTo(x, y))?;
        for glyph in glyphs {
            if self.style != Some(glyph.style) {
                self.set_style(glyph.style)?;
            }
            queue!(self.out, Print(glyph.ch))?;
        }
        Ok(())
    }

    fn set_style(&mut self, style: CellStyle) -> Result<()> {
        // Attribute reset also clears colors, so it goes first.
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        queue!(
            self.out,
            SetColors(Colors::new(term_color(style.fg), term_color(style.bg)))
        )?;
        self.style = Some(style);
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if self.style.is_some() {
            queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        }
        Ok(())
    }
}

fn term_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
