//! Transport-neutral views. A chat transport turns these into its own
//! buttons and keyboards.

use crate::models::Song;
use crate::pagination::Page;
use crate::request::{PageAction, Request};
use serde::{Deserialize, Serialize};

pub const ALPHABET_COLUMNS: usize = 4;

pub const MENU_ALPHABET: &str = "📚 Browse A–Z";
pub const MENU_ALL_SONGS: &str = "🎵 All songs";
pub const MENU_TOGGLE_PREFIX: &str = "🔍 Semantic search:";

pub const LABEL_BACK: &str = "⬅️ Back";
pub const LABEL_MORE: &str = "More ➡️";
pub const LABEL_CHORDS: &str = "🎸 Chords";
pub const LABEL_GUIDANCE: &str = "📖 Bible verse for this song";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub request: Request,
}

impl Button {
    pub fn new(label: impl Into<String>, request: Request) -> Self {
        Self {
            label: label.into(),
            request,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

pub fn render_alphabet_keyboard(letters: &[char]) -> Keyboard {
    let rows = letters
        .chunks(ALPHABET_COLUMNS)
        .map(|chunk| {
            chunk
                .iter()
                .map(|letter| Button::new(letter.to_string(), Request::ShowLetter(*letter)))
                .collect()
        })
        .collect();
    Keyboard { rows }
}

fn song_rows<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<Vec<Button>> {
    titles
        .into_iter()
        .map(|title| vec![Button::new(title, Request::ShowSong(title.to_string()))])
        .collect()
}

pub fn render_letter_keyboard(titles: &[&str]) -> Keyboard {
    Keyboard {
        rows: song_rows(titles.iter().copied()),
    }
}

/// One button per song, then a Back/More row when either applies.
pub fn render_page(page: &Page) -> Keyboard {
    let mut rows = song_rows(page.titles.iter().map(String::as_str));

    let mut navigation = Vec::new();
    if page.has_prev {
        navigation.push(Button::new(LABEL_BACK, Request::ShowPage(PageAction::Previous)));
    }
    if page.has_next {
        navigation.push(Button::new(LABEL_MORE, Request::ShowPage(PageAction::Next)));
    }
    if !navigation.is_empty() {
        rows.push(navigation);
    }

    Keyboard { rows }
}

pub fn render_navigation() -> Keyboard {
    Keyboard {
        rows: vec![
            vec![Button::new(MENU_ALPHABET, Request::ShowMenu)],
            vec![Button::new(MENU_ALL_SONGS, Request::ShowPage(PageAction::First))],
        ],
    }
}

pub fn render_song_result(song: &Song, has_chord: bool) -> Keyboard {
    let mut rows = Vec::new();
    if has_chord {
        rows.push(vec![Button::new(LABEL_CHORDS, Request::ShowChords(song.title.clone()))]);
    }
    rows.extend(render_navigation().rows);
    rows.push(vec![Button::new(
        LABEL_GUIDANCE,
        Request::ShowGuidance(song.title.clone()),
    )]);
    Keyboard { rows }
}

pub fn toggle_label(semantic_enabled: bool) -> String {
    format!(
        "{MENU_TOGGLE_PREFIX} {}",
        if semantic_enabled { "ON" } else { "OFF" }
    )
}

/// Labels of the persistent menu, one per row.
pub fn main_menu(semantic_enabled: bool) -> Vec<String> {
    vec![
        MENU_ALPHABET.to_string(),
        MENU_ALL_SONGS.to_string(),
        toggle_label(semantic_enabled),
    ]
}
