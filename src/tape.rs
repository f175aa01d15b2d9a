//! This module defines the `Tape`, the working storage of a single machine: a row of cells
//! that grows to the right on demand, with one cursor (the head) over it.
//!
//! The left end is fixed. Moving left from the first cell leaves the cursor where it is,
//! and index-based positioning uses the same 0-based, left-anchored numbering, so a position
//! reported by one tape can always be applied to a copy of it.

use crate::types::{Direction, TuringMachineError, BLANK_SYMBOL};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// A growable tape with a cursor that always points at an existing cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<char>,
    cursor: usize,
}

impl Tape {
    /// Creates a tape holding one cell per character of `content`, with the cursor on the
    /// first cell.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::EmptyInput` if `content` is empty.
    pub fn new(content: &str) -> Result<Self, TuringMachineError> {
        let cells: Vec<char> = content.chars().collect();
        if cells.is_empty() {
            return Err(TuringMachineError::EmptyInput);
        }

        Ok(Self { cells, cursor: 0 })
    }

    /// Returns the symbol under the cursor.
    pub fn read(&self) -> char {
        self.cells[self.cursor]
    }

    /// Overwrites the symbol under the cursor.
    pub fn write(&mut self, symbol: char) {
        self.cells[self.cursor] = symbol;
    }

    /// Moves the cursor one cell to the left, staying put on the first cell.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor one cell to the right, appending a blank cell when it was on the last one.
    pub fn move_right(&mut self) {
        self.cursor += 1;
        if self.cursor == self.cells.len() {
            self.cells.push(BLANK_SYMBOL);
        }
    }

    /// Moves the cursor according to a transition's move code.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Stay => {}
        }
    }

    /// Returns the 0-based index of the cursor.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Places the cursor on the `position`-th cell from the left.
    ///
    /// A position one past the last cell grows the tape by a blank first, exactly as
    /// `move_right` does from the last cell.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::PositionOutOfRange` if `position` is further than that.
    pub fn set_position(&mut self, position: usize) -> Result<(), TuringMachineError> {
        let len = self.cells.len();
        if position > len {
            return Err(TuringMachineError::PositionOutOfRange { position, len });
        }
        if position == len {
            self.cells.push(BLANK_SYMBOL);
        }

        self.cursor = position;
        Ok(())
    }

    /// Returns the number of cells on the tape.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a tape holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }
}

impl FromStr for Tape {
    type Err = TuringMachineError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Tape::new(content)
    }
}

/// Writes every cell left to right, blanks included.
impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.cells {
            f.write_char(*symbol)?;
        }

        Ok(())
    }
}
