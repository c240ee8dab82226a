//! (row, col) cursor over the document's visible text.
//!
//! Rows and columns are display coordinates over the text the tree renders;
//! `offset` translates them into the global character offsets the resolvers
//! speak. Columns may sit one past the end of a line so a selection can
//! cover the final character.

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    row: usize,
    col: usize,
    /// Global char offset of each line start.
    line_starts: Vec<usize>,
    /// Char length of each line, newline excluded.
    line_lens: Vec<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&mut self, text: &str) {
        self.line_starts.clear();
        self.line_lens.clear();
        let mut start = 0;
        for line in text.split('\n') {
            let len = line.chars().count();
            self.line_starts.push(start);
            self.line_lens.push(len);
            start += len + 1;
        }
        self.row = 0;
        self.col = 0;
    }

    pub fn pos(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn rows(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_len(&self, row: usize) -> usize {
        self.line_lens.get(row).copied().unwrap_or(0)
    }

    /// Global char offset of the cursor.
    pub fn offset(&self) -> usize {
        self.line_starts.get(self.row).copied().unwrap_or(0) + self.col
    }

    pub fn set_offset(&mut self, offset: usize) {
        for (row, &start) in self.line_starts.iter().enumerate().rev() {
            if offset >= start {
                self.row = row;
                self.col = (offset - start).min(self.line_len(row));
                return;
            }
        }
        self.row = 0;
        self.col = 0;
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(self.line_len(self.row));
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.clamp_col();
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.rows() {
            self.row += 1;
            self.clamp_col();
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.rows() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_to_top(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    pub fn move_to_bottom(&mut self) {
        if self.rows() > 0 {
            self.row = self.rows() - 1;
            self.col = 0;
        }
    }

    pub fn move_line_start(&mut self) {
        self.col = 0;
    }

    pub fn move_line_end(&mut self) {
        self.col = self.line_len(self.row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_tracks_rows_and_cols() {
        let mut cursor = Cursor::new();
        cursor.set_content("Hello\nWorld");

        assert_eq!(cursor.offset(), 0);
        cursor.move_down();
        assert_eq!(cursor.offset(), 6);
        cursor.move_right();
        cursor.move_right();
        assert_eq!(cursor.offset(), 8);
    }

    #[test]
    fn set_offset_lands_on_the_right_line() {
        let mut cursor = Cursor::new();
        cursor.set_content("Hello\nWorld");
        cursor.set_offset(8);
        assert_eq!(cursor.pos(), (1, 2));
        cursor.set_offset(5);
        assert_eq!(cursor.pos(), (0, 5));
    }

    #[test]
    fn col_can_sit_past_the_last_char() {
        let mut cursor = Cursor::new();
        cursor.set_content("ab\ncdef");
        cursor.move_line_end();
        assert_eq!(cursor.pos(), (0, 2));
        cursor.move_right();
        assert_eq!(cursor.pos(), (1, 0));
    }

    #[test]
    fn vertical_motion_clamps_columns() {
        let mut cursor = Cursor::new();
        cursor.set_content("long line here\nab");
        cursor.set_offset(10);
        cursor.move_down();
        assert_eq!(cursor.pos(), (1, 2));
    }
}
