//! Line-oriented console transport.
//!
//! Each input line is one chat message. `/tap <n>` presses the n-th button of
//! the last keyboard shown, `/reload` rebuilds the catalogue from disk, and
//! `/quit` ends the session.

use crate::log_catalogue;
use songbook_core::{Button, CatalogueOptions, Reply, SessionState, Songbook, TextCompletion};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Session states keyed by chat id, kept between turns.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl SessionStore {
    pub fn load(&self, key: &str) -> SessionState {
        self.sessions
            .lock()
            .map(|sessions| sessions.get(key).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn save(&self, key: &str, state: SessionState) {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.insert(key.to_string(), state);
    }
}

pub async fn run<C>(
    songbook: &Songbook<C>,
    options: &CatalogueOptions,
    session: &str,
) -> anyhow::Result<()>
where
    C: TextCompletion + Send + Sync,
{
    let store = SessionStore::default();
    let mut buttons: Vec<Button> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("songbook chat: type /start, /menu, /all_songs, a search, /tap <n>, /reload or /quit");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if line == "/reload" {
            match songbook.catalogue().refresh(options) {
                Ok(catalogue) => {
                    log_catalogue(&catalogue);
                    println!("reloaded {} songs", catalogue.song_count());
                }
                Err(error) => {
                    warn!(error = %error, "reload failed; keeping the current catalogue");
                    println!("reload failed: {error}");
                }
            }
            continue;
        }

        let mut state = store.load(session);
        let replies = match line.strip_prefix("/tap ") {
            Some(index) => match tapped(&buttons, index) {
                Some(button) => {
                    info!(label = %button.label, "button pressed");
                    songbook.handle_request(&mut state, button.request.clone()).await
                }
                None => {
                    println!("no button {index}");
                    continue;
                }
            },
            None => songbook.handle_text(&mut state, line).await,
        };
        store.save(session, state);

        for reply in &replies {
            print_reply(reply);
            if let Some(keyboard) = reply.keyboard() {
                buttons = keyboard.buttons().cloned().collect();
            }
        }
    }

    Ok(())
}

fn tapped<'a>(buttons: &'a [Button], index: &str) -> Option<&'a Button> {
    let number: usize = index.trim().parse().ok()?;
    buttons.get(number.checked_sub(1)?)
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Text { text, .. } => println!("{text}"),
        Reply::Edit { text, .. } => println!("(updated) {text}"),
        Reply::Document { path } => println!("[file] {}", path.display()),
        Reply::Menu { text, options } => {
            println!("{text}");
            println!("menu: {}", options.join(" | "));
        }
    }

    if let Some(keyboard) = reply.keyboard() {
        let mut number = 1;
        for row in &keyboard.rows {
            let labels: Vec<String> = row
                .iter()
                .map(|button| {
                    let label = format!("[{number}] {}", button.label);
                    number += 1;
                    label
                })
                .collect();
            println!("  {}", labels.join("  "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{tapped, SessionStore};
    use songbook_core::{Button, PageAction, Request, SessionState};

    #[test]
    fn store_returns_default_for_new_sessions_and_keeps_saved_state() {
        let store = SessionStore::default();
        assert_eq!(store.load("a"), SessionState::default());

        let mut state = SessionState::default();
        state.semantic_search = false;
        state.pagination.current_offset = 10;
        store.save("a", state);

        assert_eq!(store.load("a"), state);
        assert_eq!(store.load("b"), SessionState::default());
    }

    #[test]
    fn taps_are_one_based() {
        let buttons = vec![
            Button::new("first", Request::ShowMenu),
            Button::new("next", Request::ShowPage(PageAction::Next)),
        ];

        assert_eq!(tapped(&buttons, "2").map(|button| button.label.as_str()), Some("next"));
        assert!(tapped(&buttons, "0").is_none());
        assert!(tapped(&buttons, "3").is_none());
        assert!(tapped(&buttons, "x").is_none());
    }
}
