// Copyright 2018 Ian Johnson

// This file is part of Chip-8.

// Chip-8 is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Chip-8 is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Chip-8.  If not, see <http://www.gnu.org/licenses/>.

//! The Chip-8 display buffer.

use std::default::Default;

/// The width of the display, in pixels.
pub const WIDTH: usize = 64;
/// The height of the display, in pixels.
pub const HEIGHT: usize = 32;

/// The height of a font glyph, in rows.
pub const FONT_HEIGHT: usize = 5;

/// The font glyphs for the hex digits `0`-`F`.
///
/// Each glyph is five bytes, one byte per row, with the visible pixels in the
/// high four bits.
pub const FONT_SPRITES: [[u8; FONT_HEIGHT]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0],
    [0x20, 0x60, 0x20, 0x20, 0x70],
    [0xF0, 0x10, 0xF0, 0x80, 0xF0],
    [0xF0, 0x10, 0xF0, 0x10, 0xF0],
    [0x90, 0x90, 0xF0, 0x10, 0x10],
    [0xF0, 0x80, 0xF0, 0x10, 0xF0],
    [0xF0, 0x80, 0xF0, 0x90, 0xF0],
    [0xF0, 0x10, 0x20, 0x40, 0x40],
    [0xF0, 0x90, 0xF0, 0x90, 0xF0],
    [0xF0, 0x90, 0xF0, 0x10, 0xF0],
    [0xF0, 0x90, 0xF0, 0x90, 0x90],
    [0xE0, 0x90, 0xE0, 0x90, 0xE0],
    [0xF0, 0x80, 0x80, 0x80, 0xF0],
    [0xE0, 0x90, 0x90, 0x90, 0xE0],
    [0xF0, 0x80, 0xF0, 0x80, 0xF0],
    [0xF0, 0x80, 0xF0, 0x80, 0x80],
];

/// The pixel data of the display, in row-major order.
///
/// Each cell is either 0 (off) or 1 (on), so `Pixels[y][x]` is the state of
/// the pixel at column `x` of row `y`.
pub type Pixels = [[u8; WIDTH]; HEIGHT];

/// A Chip-8 display buffer.
pub struct Buffer {
    /// The underlying pixel data.
    data: Pixels,
}

impl Buffer {
    /// Returns a new display buffer with all pixels clear.
    pub fn new() -> Self {
        Buffer {
            data: [[0; WIDTH]; HEIGHT],
        }
    }

    /// Clears the display.
    pub fn clear(&mut self) {
        self.data = [[0; WIDTH]; HEIGHT];
    }

    /// Returns a reference to the underlying pixel data.
    pub fn data(&self) -> &Pixels {
        &self.data
    }

    /// Draws the given sprite with its top-left corner at the given position,
    /// returning whether any pixel was flipped from on to off.
    ///
    /// The sprite is eight pixels wide and one row per byte tall, and is
    /// combined with the existing pixels by XOR.  The origin wraps around the
    /// screen edges, but the pixels of the sprite itself do not: rows and
    /// columns that would fall off the bottom or right edge are clipped.
    pub fn draw_sprite(&mut self, sprite: &[u8], x: usize, y: usize) -> bool {
        let x = x % WIDTH;
        let y = y % HEIGHT;
        let mut collision = false;

        for (dy, &row) in sprite.iter().enumerate() {
            let py = y + dy;
            if py >= HEIGHT {
                break;
            }
            for dx in 0..8 {
                let px = x + dx;
                if px >= WIDTH {
                    break;
                }
                if row & (0x80 >> dx) != 0 {
                    if self.data[py][px] != 0 {
                        collision = true;
                    }
                    self.data[py][px] ^= 1;
                }
            }
        }

        collision
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::new()
    }
}
