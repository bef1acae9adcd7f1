//! UTF-8 safe text buffer with cursor management.
//!
//! Shared by the API key input and every text-like form control. Object
//! fields store multi-line JSON, so the buffer also reports the cursor as a
//! (line, column) pair for rendering.

use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the buffer and park the cursor at the end.
    pub fn reset(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.len();
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        let mut cursor = cursor.min(self.input.len());
        while !self.input.is_char_boundary(cursor) {
            cursor -= 1;
        }
        self.cursor = cursor;
    }

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().last() {
            self.cursor -= previous.len_utf8();
        }
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.input[..self.cursor].rfind('\n').map(|index| index + 1).unwrap_or(0);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input[self.cursor..]
            .find('\n')
            .map(|offset| self.cursor + offset)
            .unwrap_or(self.input.len());
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor; returns whether one was removed.
    pub fn backspace(&mut self) -> bool {
        let Some(previous) = self.input[..self.cursor].chars().last() else {
            return false;
        };
        let start = self.cursor - previous.len_utf8();
        self.input.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Delete the char under the cursor; returns whether one was removed.
    pub fn delete(&mut self) -> bool {
        let Some(next) = self.input[self.cursor..].chars().next() else {
            return false;
        };
        self.input.drain(self.cursor..self.cursor + next.len_utf8());
        true
    }

    /// Zero-based line and display column of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.input[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
        (line, before[line_start..].width())
    }
}
