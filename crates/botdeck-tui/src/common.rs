//! Shared UI primitives.

/// Lifecycle of a server-backed piece of screen data.
///
/// Stale responses are dropped by the reducer before they ever reach a
/// `Fetch`, so `Loaded` always holds the newest accepted payload.
#[derive(Debug, Clone, Default)]
pub enum Fetch<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Monotonic generation counter for in-flight fetches.
///
/// Each dispatched fetch captures the current generation; results carrying
/// an older generation are discarded. This is what keeps a slow page-1
/// response from clobbering an already rendered page 2.
#[derive(Debug, Default)]
pub struct FetchSeq(u64);

impl FetchSeq {
    /// Advances and returns the new generation.
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Returns the current generation without advancing.
    pub fn current(&self) -> u64 {
        self.0
    }
}

/// Truncates `text` to at most `max_width` display columns, appending an
/// ellipsis when anything was cut. Width-aware so CJK and emoji rows keep
/// their column alignment.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if max_width == 0 {
        return String::new();
    }
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            // Room is reserved for the ellipsis; only spend it if needed.
            let remaining: usize = text[out.len()..]
                .chars()
                .map(|c| c.width().unwrap_or(0))
                .sum();
            if width + remaining <= max_width {
                out.push_str(&text[out.len()..]);
            } else {
                out.push('…');
            }
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

/// Single-line text input with a cursor.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.byte_index(self.cursor);
        self.value.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let byte_idx = self.byte_index(self.cursor - 1);
        self.value.remove(byte_idx);
        self.cursor -= 1;
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let len = self.value.chars().count();
        if self.cursor < len {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_edits_at_cursor() {
        let mut field = TextField::default();
        for c in "abc".chars() {
            field.insert(c);
        }
        field.move_left();
        field.insert('x');
        assert_eq!(field.value(), "abxc");

        field.backspace();
        assert_eq!(field.value(), "abc");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn test_text_field_handles_multibyte() {
        let mut field = TextField::default();
        field.set("héllo");
        field.move_home();
        field.move_right();
        field.insert('é');
        assert_eq!(field.value(), "hééllo");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello", 5), "hello");
        assert_eq!(truncate_to_width("hello world", 5), "hell…");
        assert_eq!(truncate_to_width("", 5), "");
        assert_eq!(truncate_to_width("hello", 0), "");
        // Double-width characters count as two columns.
        assert_eq!(truncate_to_width("日本語のテキスト", 7), "日本語…");
    }

    #[test]
    fn test_fetch_seq_is_monotonic() {
        let mut seq = FetchSeq::default();
        let first = seq.next();
        let second = seq.next();
        assert!(second > first);
        assert_eq!(seq.current(), second);
    }
}
