//! Multi-line prompt editor that grows with its content

/// Rows the prompt box shows when empty
pub const MIN_ROWS: u16 = 1;
/// Rows the prompt box grows to before it scrolls internally
pub const MAX_ROWS: u16 = 6;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Rows a logical line of `len` chars takes at `width`.
/// A full last row reserves one more so the cursor has somewhere to sit.
fn rows_for(len: usize, width: usize) -> usize {
    len / width + 1
}

#[derive(Debug)]
pub struct PromptInput {
    text: String,
    cursor: usize, // char index into text
    enabled: bool,
    scroll: u16,
}

impl Default for PromptInput {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptInput {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            enabled: true,
            scroll: 0,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.enabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if !self.enabled || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if !self.enabled || self.cursor >= self.text.chars().count() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    /// Move to the start of the current logical line
    pub fn move_home(&mut self) {
        let before: Vec<char> = self.text.chars().take(self.cursor).collect();
        let line_start = before
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        self.cursor = line_start;
    }

    /// Move to the end of the current logical line
    pub fn move_end(&mut self) {
        let rest = self.text.chars().skip(self.cursor);
        let mut offset = 0;
        for c in rest {
            if c == '\n' {
                break;
            }
            offset += 1;
        }
        self.cursor += offset;
    }

    /// Clear the editor and hand back what was typed. Height returns to the minimum.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.scroll = 0;
        std::mem::take(&mut self.text)
    }

    /// Rows the editor content wraps to at `width` columns
    pub fn wrapped_rows(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        let rows: usize = self
            .text
            .split('\n')
            .map(|line| rows_for(line.chars().count(), width))
            .sum();
        rows.min(u16::MAX as usize) as u16
    }

    /// Visible height in rows: grows with content between `MIN_ROWS` and `MAX_ROWS`
    pub fn height(&self, width: u16) -> u16 {
        self.wrapped_rows(width).clamp(MIN_ROWS, MAX_ROWS)
    }

    /// The rows the renderer draws, wrapped the same way cursor math assumes
    pub fn wrapped_lines(&self, width: u16) -> Vec<String> {
        let width = width.max(1) as usize;
        let mut rows = Vec::new();
        for line in self.text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(width) {
                rows.push(chunk.iter().collect());
            }
            // Full (or empty) last row: the cursor moves to a fresh row
            if chars.len() % width == 0 {
                rows.push(String::new());
            }
        }
        rows
    }

    /// Cursor location as (row, column) in wrapped coordinates
    pub fn cursor_position(&self, width: u16) -> (u16, u16) {
        let width = width.max(1) as usize;
        let before: String = self.text.chars().take(self.cursor).collect();
        let mut lines = before.split('\n').peekable();
        let mut row = 0usize;
        let mut col = 0usize;

        while let Some(line) = lines.next() {
            let len = line.chars().count();
            if lines.peek().is_some() {
                row += rows_for(len, width);
            } else {
                row += len / width;
                col = len % width;
            }
        }

        (row.min(u16::MAX as usize) as u16, col as u16)
    }

    /// Adjust the internal scroll so the cursor row stays inside the visible rows
    pub fn scroll_to_cursor(&mut self, width: u16) {
        let visible = self.height(width);
        let (row, _) = self.cursor_position(width);
        let max_scroll = self.wrapped_rows(width).saturating_sub(visible);

        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + visible {
            self.scroll = row + 1 - visible;
        }
        self.scroll = self.scroll.min(max_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> PromptInput {
        let mut input = PromptInput::new();
        for c in text.chars() {
            if c == '\n' {
                input.insert_newline();
            } else {
                input.insert_char(c);
            }
        }
        input
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut input = typed("olá");
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "oá");
        input.insert_char('ç');
        assert_eq!(input.value(), "oçá");
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "oç");
    }

    #[test]
    fn test_disabled_input_ignores_edits() {
        let mut input = typed("hi");
        input.disable();
        input.insert_char('!');
        input.backspace();
        input.insert_newline();
        assert_eq!(input.value(), "hi");

        input.enable();
        input.insert_char('!');
        assert_eq!(input.value(), "hi!");
    }

    #[test]
    fn test_height_grows_then_caps() {
        let mut input = PromptInput::new();
        assert_eq!(input.height(10), MIN_ROWS);

        for _ in 0..3 {
            input.insert_char('x');
            input.insert_newline();
        }
        assert_eq!(input.height(10), 4);

        for _ in 0..10 {
            input.insert_char('x');
            input.insert_newline();
        }
        assert_eq!(input.height(10), MAX_ROWS);
        assert!(input.wrapped_rows(10) > MAX_ROWS);
    }

    #[test]
    fn test_long_line_wraps() {
        let input = typed(&"a".repeat(25));
        assert_eq!(input.wrapped_rows(10), 3);
        assert_eq!(input.cursor_position(10), (2, 5));
        assert_eq!(input.wrapped_lines(10).len(), 3);
    }

    #[test]
    fn test_full_row_moves_cursor_to_next_row() {
        let input = typed(&"a".repeat(10));
        assert_eq!(input.cursor_position(10), (1, 0));
        assert_eq!(input.wrapped_rows(10), 2);
        assert_eq!(input.wrapped_lines(10), vec!["a".repeat(10), String::new()]);
    }

    #[test]
    fn test_cursor_position_across_newlines() {
        let mut input = typed("ab\ncde");
        assert_eq!(input.cursor_position(10), (1, 3));
        input.move_home();
        assert_eq!(input.cursor_position(10), (1, 0));
        input.move_left();
        assert_eq!(input.cursor_position(10), (0, 2));
    }

    #[test]
    fn test_take_resets_height() {
        let mut input = typed("one\ntwo\nthree\nfour\nfive\nsix\nseven\neight");
        input.scroll_to_cursor(20);
        assert_eq!(input.height(20), MAX_ROWS);
        assert!(input.scroll() > 0);

        let text = input.take();
        assert!(text.starts_with("one\n"));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.scroll(), 0);
        assert_eq!(input.height(20), MIN_ROWS);
    }

    #[test]
    fn test_scroll_follows_cursor_up() {
        let mut input = typed("1\n2\n3\n4\n5\n6\n7\n8");
        input.scroll_to_cursor(20);
        assert_eq!(input.scroll(), 2);

        for _ in 0..input.value().chars().count() {
            input.move_left();
        }
        input.scroll_to_cursor(20);
        assert_eq!(input.scroll(), 0);
    }
}
