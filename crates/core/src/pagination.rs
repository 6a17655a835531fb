use serde::{Deserialize, Serialize};

/// One page of the title listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub titles: Vec<String>,
    pub offset: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    fn slice(titles: &[String], start: usize, end: usize) -> Self {
        let end = end.min(titles.len());
        let start = start.min(end);
        Self {
            titles: titles[start..end].to_vec(),
            offset: start,
            has_next: end < titles.len(),
            has_prev: start > 0,
        }
    }
}

/// Per-session cursor over the sorted title list.
///
/// `current_offset` is where the next forward page starts; `previous_offset`
/// is where the page on screen starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_offset: usize,
    pub previous_offset: Option<usize>,
}

impl PaginationState {
    pub fn reset_and_show_first_page(&mut self, titles: &[String], page_size: usize) -> Page {
        *self = Self::default();
        self.advance(titles, page_size)
    }

    /// Shows the page starting at `current_offset`. Past the end it shows
    /// the last page again.
    pub fn advance(&mut self, titles: &[String], page_size: usize) -> Page {
        let page_size = page_size.max(1);
        let total = titles.len();
        if total == 0 {
            *self = Self::default();
            return Page::slice(titles, 0, 0);
        }

        let start = if self.current_offset >= total {
            (total - 1) / page_size * page_size
        } else {
            self.current_offset
        };
        let next = start + page_size;
        let page = Page::slice(titles, start, next);

        self.previous_offset = Some(start);
        self.current_offset = next;
        page
    }

    /// Shows the page before the one on screen; at the start of the list
    /// this is the first page again.
    pub fn retreat(&mut self, titles: &[String], page_size: usize) -> Page {
        let page_size = page_size.max(1);
        match self.previous_offset {
            Some(previous) if previous > 0 => {
                let previous = previous.min(titles.len());
                let start = previous.saturating_sub(page_size);
                let page = Page::slice(titles, start, previous);
                self.current_offset = previous;
                self.previous_offset = Some(start);
                page
            }
            _ => self.reset_and_show_first_page(titles, page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PaginationState;

    fn titles(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("Song {index:03}")).collect()
    }

    #[test]
    fn first_page_resets_state() {
        let titles = titles(25);
        let mut state = PaginationState {
            current_offset: 20,
            previous_offset: Some(10),
        };

        let page = state.reset_and_show_first_page(&titles, 10);

        assert_eq!(page.titles, titles[0..10]);
        assert!(page.has_next);
        assert!(!page.has_prev);
        assert_eq!(state.current_offset, 10);
        assert_eq!(state.previous_offset, Some(0));
    }

    #[test]
    fn advancing_visits_every_title_exactly_once() {
        for (count, page_size) in [(0usize, 10usize), (1, 10), (10, 10), (25, 10), (31, 7), (9, 1)] {
            let titles = titles(count);
            let mut state = PaginationState::default();
            let mut seen = Vec::new();
            let mut last = None;

            for _ in 0..count.div_ceil(page_size) {
                let page = state.advance(&titles, page_size);
                seen.extend(page.titles.clone());
                last = Some(page);
            }

            assert_eq!(seen, titles, "count={count} page_size={page_size}");
            if let Some(last) = last {
                assert!(!last.has_next);
            }
        }
    }

    #[test]
    fn empty_catalogue_has_no_navigation() {
        let mut state = PaginationState::default();

        for page in [
            state.reset_and_show_first_page(&[], 10),
            state.advance(&[], 10),
            state.retreat(&[], 10),
        ] {
            assert!(page.titles.is_empty());
            assert!(!page.has_next);
            assert!(!page.has_prev);
        }
    }

    #[test]
    fn retreat_after_reset_shows_first_page_again() {
        let titles = titles(25);
        let mut state = PaginationState::default();

        let first = state.reset_and_show_first_page(&titles, 10);
        let snapshot = state;
        let again = state.retreat(&titles, 10);

        assert_eq!(first, again);
        assert_eq!(state, snapshot);
        assert_eq!(state.retreat(&titles, 10), first);
    }

    #[test]
    fn retreat_on_fresh_state_shows_first_page() {
        let titles = titles(5);
        let mut state = PaginationState::default();
        let page = state.retreat(&titles, 10);
        assert_eq!(page.titles, titles);
        assert!(!page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn forward_then_back_walks_pages_in_reverse() {
        let titles = titles(35);
        let mut state = PaginationState::default();

        state.reset_and_show_first_page(&titles, 10);
        state.advance(&titles, 10);
        let third = state.advance(&titles, 10);
        assert_eq!(third.offset, 20);
        assert!(third.has_prev);

        let second = state.retreat(&titles, 10);
        assert_eq!(second.titles, titles[10..20]);
        assert!(second.has_prev);
        assert!(second.has_next);

        let first = state.retreat(&titles, 10);
        assert_eq!(first.titles, titles[0..10]);
        assert!(!first.has_prev);

        let forward = state.advance(&titles, 10);
        assert_eq!(forward.titles, titles[10..20]);
    }

    #[test]
    fn advancing_past_the_end_clamps_to_last_page() {
        let titles = titles(25);
        let mut state = PaginationState::default();

        for _ in 0..3 {
            state.advance(&titles, 10);
        }
        let clamped = state.advance(&titles, 10);

        assert_eq!(clamped.titles, titles[20..25]);
        assert!(!clamped.has_next);
        assert!(clamped.has_prev);
    }

    #[test]
    fn shrunken_catalogue_does_not_panic_on_stale_offsets() {
        let titles = titles(3);
        let mut state = PaginationState {
            current_offset: 50,
            previous_offset: Some(40),
        };

        let back = state.retreat(&titles, 10);
        assert_eq!(back.titles, titles);
        assert!(!back.has_next);

        let forward = state.advance(&titles, 10);
        assert_eq!(forward.titles, titles);
    }
}
