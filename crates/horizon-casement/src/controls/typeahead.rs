//! Keyboard type-ahead for list-like controls.

use std::time::{Duration, Instant};

/// Accumulates recently typed characters into a search prefix.
///
/// The prefix starts over when more than the timeout passes between two
/// characters.
#[derive(Debug, Clone, Default)]
pub struct TypeAhead {
    prefix: String,
    last_input: Option<Instant>,
}

impl TypeAhead {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character typed at `now` and return the current prefix.
    pub fn push(&mut self, ch: char, now: Instant, timeout: Duration) -> &str {
        let expired = self
            .last_input
            .is_none_or(|last| now.saturating_duration_since(last) > timeout);
        if expired {
            self.prefix.clear();
        }
        self.prefix.extend(ch.to_lowercase());
        self.last_input = Some(now);
        &self.prefix
    }

    /// The current prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Forget the prefix.
    pub fn reset(&mut self) {
        self.prefix.clear();
        self.last_input = None;
    }

    /// Search `count` items for one whose text starts with the prefix,
    /// ignoring case.
    ///
    /// A single-character prefix starts after `current` so that repeated
    /// presses of the same key cycle through the matches; a longer prefix
    /// starts at `current` so the match stays put while it is refined. The
    /// scan wraps around.
    pub fn find(
        &self,
        count: usize,
        current: Option<usize>,
        mut text_of: impl FnMut(usize) -> String,
    ) -> Option<usize> {
        if count == 0 || self.prefix.is_empty() {
            return None;
        }
        let first = match current {
            Some(current) if self.prefix.chars().count() == 1 => current + 1,
            Some(current) => current,
            None => 0,
        };
        (0..count)
            .map(|step| (first + step) % count)
            .find(|&index| text_of(index).to_lowercase().starts_with(&self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn items() -> Vec<&'static str> {
        vec!["Apple", "banana", "Blueberry", "cherry", "Bilberry"]
    }

    fn find(typeahead: &TypeAhead, current: Option<usize>) -> Option<usize> {
        let items = items();
        typeahead.find(items.len(), current, |i| items[i].to_owned())
    }

    #[test]
    fn test_prefix_accumulates_and_expires() {
        let start = Instant::now();
        let mut typeahead = TypeAhead::new();
        assert_eq!(typeahead.push('B', start, TIMEOUT), "b");
        assert_eq!(typeahead.push('l', start + Duration::from_millis(500), TIMEOUT), "bl");
        assert_eq!(typeahead.push('c', start + Duration::from_secs(3), TIMEOUT), "c");
    }

    #[test]
    fn test_single_char_cycles_through_matches() {
        let now = Instant::now();
        let mut typeahead = TypeAhead::new();
        typeahead.push('b', now, TIMEOUT);
        assert_eq!(find(&typeahead, None), Some(1));
        assert_eq!(find(&typeahead, Some(1)), Some(2));
        assert_eq!(find(&typeahead, Some(4)), Some(1));
    }

    #[test]
    fn test_longer_prefix_refines_in_place() {
        let now = Instant::now();
        let mut typeahead = TypeAhead::new();
        typeahead.push('b', now, TIMEOUT);
        typeahead.push('i', now, TIMEOUT);
        assert_eq!(find(&typeahead, Some(2)), Some(4));
        typeahead.push('x', now, TIMEOUT);
        assert_eq!(find(&typeahead, Some(4)), None);
    }
}
