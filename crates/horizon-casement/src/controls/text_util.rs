//! Character-offset text helpers shared by the text controls.
//!
//! Control state stores positions as *character* offsets so that multi-byte
//! UTF-8 sequences can never be split. Byte offsets are derived only when a
//! slice of the underlying `String` is needed.

use std::ops::Range;

use horizon_casement_core::TextMeasure;

/// Number of characters in `text`.
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of character `index`, clamped to the end of the text.
pub fn char_to_byte(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Character offset of byte `offset`. Offsets inside a sequence count the
/// characters that start before them.
pub fn byte_to_char(text: &str, offset: usize) -> usize {
    text.char_indices()
        .take_while(|&(byte, _)| byte < offset)
        .count()
}

/// Byte range of the characters `start..end`.
pub fn char_range_to_bytes(text: &str, start: usize, end: usize) -> Range<usize> {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    char_to_byte(text, start)..char_to_byte(text, end)
}

/// Whether a character belongs to a word run: ASCII alphanumerics, `_`, and
/// every non-ASCII character.
#[inline]
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || !ch.is_ascii()
}

/// Start of the word at or before `pos`.
///
/// Skips the non-word characters before `pos`, then the word run before
/// them.
pub fn word_left(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut index = pos.min(chars.len());
    while index > 0 && !is_word_char(chars[index - 1]) {
        index -= 1;
    }
    while index > 0 && is_word_char(chars[index - 1]) {
        index -= 1;
    }
    index
}

/// Start of the next word after `pos`.
///
/// Skips the rest of the current word run, then the non-word characters
/// after it.
pub fn word_right(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut index = pos.min(chars.len());
    while index < chars.len() && is_word_char(chars[index]) {
        index += 1;
    }
    while index < chars.len() && !is_word_char(chars[index]) {
        index += 1;
    }
    index
}

/// The word run containing `pos` (used for double-click selection).
///
/// Outside a word, the run of non-word characters around `pos` is returned
/// instead.
pub fn word_at(text: &str, pos: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return (0, 0);
    }
    let pos = pos.min(chars.len() - 1);
    let class = is_word_char(chars[pos]);
    let mut start = pos;
    while start > 0 && is_word_char(chars[start - 1]) == class && chars[start - 1] != '\n' {
        start -= 1;
    }
    let mut end = pos;
    while end < chars.len() && is_word_char(chars[end]) == class && chars[end] != '\n' {
        end += 1;
    }
    (start, end.max(start))
}

/// One display line: `len` characters starting at character `start`.
///
/// `len` excludes the line break, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// First character of the line.
    pub start: usize,
    /// Number of characters on the line.
    pub len: usize,
}

impl LineSpan {
    /// One past the last character.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Break `text` into display lines.
///
/// Hard breaks (`\n`) always end a line. With `wrap_width` set, whole words
/// are packed greedily while they fit; a word wider than the line is split
/// between characters. Trailing spaces stay on the line that precedes the
/// break.
pub fn wrap_lines(text: &str, wrap_width: Option<i32>, metrics: &dyn TextMeasure) -> Vec<LineSpan> {
    let mut lines = Vec::new();
    let mut start = 0;
    for paragraph in text.split('\n') {
        let len = char_len(paragraph);
        match wrap_width {
            Some(width) if width > 0 => wrap_paragraph(paragraph, start, width, metrics, &mut lines),
            _ => lines.push(LineSpan { start, len }),
        }
        start += len + 1;
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    offset: usize,
    width: i32,
    metrics: &dyn TextMeasure,
    lines: &mut Vec<LineSpan>,
) {
    let chars: Vec<char> = paragraph.chars().collect();
    if chars.is_empty() {
        lines.push(LineSpan { start: offset, len: 0 });
        return;
    }
    let mut line_start = 0;
    let mut line_width = 0;
    let mut index = 0;
    while index < chars.len() {
        // A token is a run of non-spaces followed by its spaces.
        let token_start = index;
        while index < chars.len() && chars[index] != ' ' {
            index += 1;
        }
        let word_end = index;
        while index < chars.len() && chars[index] == ' ' {
            index += 1;
        }
        let word_width: i32 = chars[token_start..word_end]
            .iter()
            .map(|&ch| metrics.char_width(ch))
            .sum();
        let space_width: i32 = chars[word_end..index]
            .iter()
            .map(|&ch| metrics.char_width(ch))
            .sum();

        if line_width + word_width <= width {
            line_width += word_width + space_width;
            continue;
        }
        if token_start > line_start {
            lines.push(LineSpan {
                start: offset + line_start,
                len: token_start - line_start,
            });
            line_start = token_start;
            line_width = 0;
        }
        if word_width <= width {
            line_width = word_width + space_width;
            continue;
        }
        // The word alone is too wide: split it between characters.
        let mut cursor = token_start;
        let mut run = 0;
        while cursor < word_end {
            let advance = metrics.char_width(chars[cursor]);
            if run + advance > width && cursor > line_start {
                lines.push(LineSpan {
                    start: offset + line_start,
                    len: cursor - line_start,
                });
                line_start = cursor;
                run = 0;
            }
            run += advance;
            cursor += 1;
        }
        line_width = run + space_width;
    }
    lines.push(LineSpan {
        start: offset + line_start,
        len: chars.len() - line_start,
    });
}

/// Cache of the display lines of a text buffer.
///
/// The table is keyed by the content length and the wrap width it was built
/// for. Edits must call [`LineCache::invalidate`]; a key mismatch rebuilds
/// the table on the next lookup.
#[derive(Debug, Default, Clone)]
pub struct LineCache {
    key: Option<(usize, Option<i32>)>,
    lines: Vec<LineSpan>,
}

impl LineCache {
    /// Drop the cached table.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.lines.clear();
    }

    /// Whether a table is cached for this content length and wrap width.
    pub fn is_valid_for(&self, content_len: usize, wrap_width: Option<i32>) -> bool {
        self.key == Some((content_len, wrap_width))
    }

    /// The display lines of `text`, rebuilding the table if needed.
    pub fn lines(
        &mut self,
        text: &str,
        wrap_width: Option<i32>,
        metrics: &dyn TextMeasure,
    ) -> &[LineSpan] {
        if !self.is_valid_for(text.len(), wrap_width) {
            self.lines = wrap_lines(text, wrap_width, metrics);
            self.key = Some((text.len(), wrap_width));
            tracing::trace!(
                target: super::TARGET,
                lines = self.lines.len(),
                ?wrap_width,
                "line table rebuilt"
            );
        }
        &self.lines
    }
}

/// Index of the line containing character `pos`.
///
/// A position at the end of a wrapped line belongs to the next line, except
/// at the very end of the text.
pub fn line_of(lines: &[LineSpan], pos: usize) -> usize {
    match lines.iter().rposition(|line| line.start <= pos) {
        Some(index) => index,
        None => 0,
    }
}

/// Character offset within `line_text` closest to pixel `x`.
pub fn char_at_x(line_text: &str, x: i32, metrics: &dyn TextMeasure) -> usize {
    let mut left = 0;
    for (index, ch) in line_text.chars().enumerate() {
        let advance = metrics.char_width(ch);
        if x < left + advance / 2 {
            return index;
        }
        left += advance;
    }
    char_len(line_text)
}

/// Substring of `text` covering the characters of `span`.
pub fn span_text<'a>(text: &'a str, span: LineSpan) -> &'a str {
    &text[char_range_to_bytes(text, span.start, span.end())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_casement_core::MonospaceMetrics;

    const METRICS: MonospaceMetrics = MonospaceMetrics {
        char_width: 10,
        line_height: 16,
    };

    #[test]
    fn test_char_byte_conversion() {
        let text = "café!";
        assert_eq!(char_len(text), 5);
        assert_eq!(char_to_byte(text, 3), 3);
        assert_eq!(char_to_byte(text, 4), 5);
        assert_eq!(char_to_byte(text, 9), 6);
        assert_eq!(byte_to_char(text, 5), 4);
        assert_eq!(byte_to_char(text, 4), 4);
        assert_eq!(char_range_to_bytes(text, 4, 2), 2..5);
    }

    #[test]
    fn test_word_movement() {
        assert_eq!(word_left("café!", 5), 0);
        assert_eq!(word_left("hello world", 11), 6);
        assert_eq!(word_left("hello world", 6), 0);
        assert_eq!(word_right("hello world", 0), 6);
        assert_eq!(word_right("snake_case x", 0), 11);
        assert_eq!(word_right("café!", 0), 5);
    }

    #[test]
    fn test_word_at() {
        assert_eq!(word_at("one two", 5), (4, 7));
        assert_eq!(word_at("one  two", 3), (3, 5));
        assert_eq!(word_at("", 0), (0, 0));
    }

    #[test]
    fn test_wrap_packs_whole_words() {
        // 10px per char, 80px per line: "the quick " fits in 8 chars only up to "the ".
        let lines = wrap_lines("the quick brown fox", Some(80), &METRICS);
        let texts: Vec<&str> = lines
            .iter()
            .map(|&span| span_text("the quick brown fox", span))
            .collect();
        assert_eq!(texts, vec!["the ", "quick ", "brown ", "fox"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let text = "abcdefghij xy";
        let lines = wrap_lines(text, Some(40), &METRICS);
        let texts: Vec<&str> = lines.iter().map(|&span| span_text(text, span)).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij ", "xy"]);
    }

    #[test]
    fn test_wrap_hard_breaks() {
        let lines = wrap_lines("a\n\nb", None, &METRICS);
        assert_eq!(
            lines,
            vec![
                LineSpan { start: 0, len: 1 },
                LineSpan { start: 2, len: 0 },
                LineSpan { start: 3, len: 1 },
            ]
        );
        assert_eq!(line_of(&lines, 2), 1);
        assert_eq!(line_of(&lines, 4), 2);
    }

    #[test]
    fn test_line_cache_keyed_by_length_and_width() {
        let mut cache = LineCache::default();
        assert_eq!(cache.lines("ab cd", Some(30), &METRICS).len(), 2);
        assert!(cache.is_valid_for(5, Some(30)));
        assert!(!cache.is_valid_for(5, Some(100)));
        assert_eq!(cache.lines("ab cd", Some(100), &METRICS).len(), 1);
        cache.invalidate();
        assert!(!cache.is_valid_for(5, Some(100)));
    }

    #[test]
    fn test_char_at_x_rounds_to_nearest_boundary() {
        assert_eq!(char_at_x("abc", 4, &METRICS), 0);
        assert_eq!(char_at_x("abc", 6, &METRICS), 1);
        assert_eq!(char_at_x("abc", 100, &METRICS), 3);
    }
}
