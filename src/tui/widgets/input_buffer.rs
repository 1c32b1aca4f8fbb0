//! Single-line text input with cursor management and an optional
//! character filter, shared by the date controls and the order form.

/// Characters a buffer will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharFilter {
    Any,
    /// ASCII digits only (PIN codes).
    Digits,
    /// Digits plus `+ - ( )` and spaces (phone numbers).
    Phone,
    /// Digits and `-` (ISO dates).
    Date,
}

impl CharFilter {
    fn accepts(self, c: char) -> bool {
        match self {
            CharFilter::Any => !c.is_control(),
            CharFilter::Digits => c.is_ascii_digit(),
            CharFilter::Phone => c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '),
            CharFilter::Date => c.is_ascii_digit() || c == '-',
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputBuffer {
    content: String,
    /// Byte offset into `content`.
    cursor: usize,
    filter: CharFilter,
    max_chars: Option<usize>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            filter: CharFilter::Any,
            max_chars: None,
        }
    }

    pub fn with_filter(mut self, filter: CharFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    /// Replace the content and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.content = text.to_string();
        self.cursor = self.content.len();
    }

    /// Insert `c` at the cursor. Returns `false` if it was rejected.
    pub fn insert_char(&mut self, c: char) -> bool {
        if !self.filter.accepts(c) {
            return false;
        }
        if self
            .max_chars
            .is_some_and(|max| self.content.chars().count() >= max)
        {
            return false;
        }
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        true
    }

    fn prev_boundary(&self) -> usize {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.content.len())
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.next_boundary();
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Whitespace-only counts as empty.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.content[..self.cursor].chars().count()
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
