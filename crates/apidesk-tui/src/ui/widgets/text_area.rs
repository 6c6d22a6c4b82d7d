//! Multi-line text editing widget used by the content editor.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Width of the line number gutter, including the trailing space.
const GUTTER_WIDTH: u16 = 5;

/// Editing state: content plus a cursor measured in characters.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    content: String,
    /// Cursor position (character index into `content`).
    cursor: usize,
}

impl TextAreaState {
    /// Create a state with the cursor at the end of `content`.
    pub fn with_content(content: impl Into<String>) -> Self {
        let content = content.into();
        let cursor = content.chars().count();
        Self { content, cursor }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    /// Move to the start of the current line.
    pub fn move_home(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = self.line_start(row);
    }

    /// Move to the end of the current line.
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

    /// Cursor as `(row, column)`, both in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut row = 0;
        let mut col = 0;
        for ch in self.content.chars().take(self.cursor) {
            if ch == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }

    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Create a widget from this state.
    pub fn widget(&self) -> TextArea<'_> {
        TextArea {
            state: self,
            block: None,
            focused: true,
        }
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn line_start(&self, row: usize) -> usize {
        self.content
            .split('\n')
            .take(row)
            .map(|line| line.chars().count() + 1)
            .sum()
    }

    fn line_len(&self, row: usize) -> usize {
        self.content
            .split('\n')
            .nth(row)
            .map_or(0, |line| line.chars().count())
    }
}

/// Renders a [`TextAreaState`] with a line number gutter, scrolled so the
/// cursor row stays visible.
#[derive(Debug, Clone)]
pub struct TextArea<'a> {
    state: &'a TextAreaState,
    block: Option<Block<'a>>,
    focused: bool,
}

impl<'a> TextArea<'a> {
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TextArea<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width <= GUTTER_WIDTH {
            return;
        }

        let (cursor_row, cursor_col) = self.state.cursor_position();
        let height = inner.height as usize;
        let first_row = (cursor_row + 1).saturating_sub(height);
        let text_x = inner.x + GUTTER_WIDTH;
        let text_width = (inner.width - GUTTER_WIDTH) as usize;

        for (offset, line) in self
            .state
            .content
            .split('\n')
            .enumerate()
            .skip(first_row)
            .take(height)
        {
            let y = inner.y + (offset - first_row) as u16;
            buf.set_stringn(
                inner.x,
                y,
                format!("{:>4} ", offset + 1),
                GUTTER_WIDTH as usize,
                Styles::gutter(),
            );
            buf.set_stringn(text_x, y, line, text_width, Styles::default());
        }

        if self.focused {
            let line = self.state.content.split('\n').nth(cursor_row).unwrap_or("");
            let before: String = line.chars().take(cursor_col).collect();
            let x = text_x as usize + before.width();
            let y = inner.y as usize + (cursor_row - first_row);
            if x < (inner.x + inner.width) as usize {
                buf[(x as u16, y as u16)].set_style(Styles::cursor());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_insert_and_backspace() {
        let mut state = TextAreaState::default();
        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor, 2);

        state.backspace();
        assert_eq!(state.content(), "H");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut state = TextAreaState::with_content("naïve");
        state.move_left();
        state.move_left();
        state.insert('X');
        assert_eq!(state.content(), "naïXve");

        state.move_home();
        state.delete();
        assert_eq!(state.content(), "aïXve");
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut state = TextAreaState::with_content("long line\nab\nlonger line");
        assert_eq!(state.cursor_position(), (2, 11));

        state.move_up();
        assert_eq!(state.cursor_position(), (1, 2));

        state.move_up();
        assert_eq!(state.cursor_position(), (0, 2));

        state.move_end();
        assert_eq!(state.cursor_position(), (0, 9));

        state.move_down();
        state.move_down();
        assert_eq!(state.cursor_position(), (2, 2));
    }

    #[test]
    fn test_newline_insert() {
        let mut state = TextAreaState::with_content("ab");
        state.move_left();
        state.insert('\n');
        assert_eq!(state.content(), "a\nb");
        assert_eq!(state.cursor_position(), (1, 0));
        assert_eq!(state.line_count(), 2);
    }

    #[test]
    fn test_render_with_gutter() {
        let state = TextAreaState::with_content("# Title\nbody");
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        state.widget().focused(false).render(area, &mut buf);

        let text = buffer_to_string(&buf);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "   1 # Title");
        assert_eq!(lines[1], "   2 body");
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let state = TextAreaState::with_content("1\n2\n3\n4\n5");
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        state.widget().render(area, &mut buf);

        let text = buffer_to_string(&buf);
        assert!(text.contains("   5 5"));
        assert!(!text.contains("   1 1"));
    }
}
