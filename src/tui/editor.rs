//! Multiline text buffer for the SQL editor.
//!
//! Positions are character indices, so Cyrillic literals edit correctly.

/// Editor text and cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    text: String,
    /// Cursor position (character index).
    cursor: usize,
}

impl EditorState {
    /// Creates an editor holding `text` with the cursor at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Inserts a line break.
    pub fn newline(&mut self) {
        self.insert('\n');
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Moves to the start of the current line.
    pub fn move_home(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = self.line_start(row);
    }

    /// Moves to the end of the current line.
    pub fn move_end(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = self.line_start(row) + self.line_len(row);
    }

    pub fn move_up(&mut self) {
        let (row, col) = self.cursor_position();
        if row > 0 {
            self.cursor = self.line_start(row - 1) + col.min(self.line_len(row - 1));
        }
    }

    pub fn move_down(&mut self) {
        let (row, col) = self.cursor_position();
        if row + 1 < self.line_count() {
            self.cursor = self.line_start(row + 1) + col.min(self.line_len(row + 1));
        }
    }

    /// Lines of the buffer; a trailing newline yields a final empty line.
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn line_len(&self, row: usize) -> usize {
        self.text
            .split('\n')
            .nth(row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    fn line_start(&self, row: usize) -> usize {
        self.text
            .split('\n')
            .take(row)
            .map(|line| line.chars().count() + 1)
            .sum()
    }

    /// Cursor as (line, column), both in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut row = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }
}
