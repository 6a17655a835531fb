pub mod catalogue;
pub mod chords;
pub mod dispatcher;
pub mod docx;
pub mod error;
pub mod gemini;
pub mod loader;
pub mod models;
pub mod pagination;
pub mod prompt;
pub mod render;
pub mod request;
pub mod service;
pub mod traits;

pub use catalogue::{Catalogue, CatalogueHandle};
pub use chords::{
    best_match, match_chord_files, normalize_stem, similarity, ChordMatchReport, DuplicateChord,
    TitleMatch,
};
pub use dispatcher::{exact_matches, SearchDispatcher};
pub use docx::{extract_lyrics, DocumentExtractor, DocxExtractor};
pub use error::{CollaboratorError, LoadError, NotFound, RequestDecodeError};
pub use gemini::{GeminiClient, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
pub use loader::{discover_files, load_songs, SongLoadReport};
pub use models::{
    CatalogueOptions, ChordBinding, DispatcherOptions, Guidance, SearchMode, SearchOutcome,
    SkippedFile, Song, DEFAULT_MATCH_CUTOFF, DEFAULT_PAGE_SIZE,
};
pub use pagination::{Page, PaginationState};
pub use render::{
    main_menu, render_alphabet_keyboard, render_letter_keyboard, render_navigation, render_page,
    render_song_result, Button, Keyboard,
};
pub use request::{PageAction, Request};
pub use service::{Command, Reply, SessionState, Songbook};
pub use traits::TextCompletion;
