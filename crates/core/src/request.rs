use crate::error::RequestDecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageAction {
    First,
    Next,
    Previous,
}

/// Everything a button can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Request {
    ShowPage(PageAction),
    ShowLetter(char),
    ShowSong(String),
    ShowChords(String),
    ShowGuidance(String),
    ShowMenu,
}

impl Request {
    /// Compact `kind:payload` form carried by buttons.
    pub fn encode(&self) -> String {
        match self {
            Self::ShowPage(PageAction::First) => "page:first".to_string(),
            Self::ShowPage(PageAction::Next) => "page:next".to_string(),
            Self::ShowPage(PageAction::Previous) => "page:prev".to_string(),
            Self::ShowLetter(letter) => format!("letter:{letter}"),
            Self::ShowSong(title) => format!("song:{title}"),
            Self::ShowChords(title) => format!("chords:{title}"),
            Self::ShowGuidance(title) => format!("guidance:{title}"),
            Self::ShowMenu => "menu".to_string(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, RequestDecodeError> {
        let (kind, payload) = match raw.split_once(':') {
            Some((kind, payload)) => (kind, Some(payload)),
            None => (raw, None),
        };

        let required = |payload: Option<&str>| -> Result<String, RequestDecodeError> {
            payload
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| RequestDecodeError::MissingPayload {
                    kind: kind.to_string(),
                })
        };

        match kind {
            "menu" => Ok(Self::ShowMenu),
            "page" => match required(payload)?.as_str() {
                "first" => Ok(Self::ShowPage(PageAction::First)),
                "next" => Ok(Self::ShowPage(PageAction::Next)),
                "prev" => Ok(Self::ShowPage(PageAction::Previous)),
                other => Err(RequestDecodeError::InvalidPayload {
                    kind: kind.to_string(),
                    payload: other.to_string(),
                }),
            },
            "letter" => {
                let payload = required(payload)?;
                let mut chars = payload.chars();
                match (chars.next(), chars.next()) {
                    (Some(letter), None) => Ok(Self::ShowLetter(letter)),
                    _ => Err(RequestDecodeError::InvalidPayload {
                        kind: kind.to_string(),
                        payload,
                    }),
                }
            }
            "song" => Ok(Self::ShowSong(required(payload)?)),
            "chords" => Ok(Self::ShowChords(required(payload)?)),
            "guidance" => Ok(Self::ShowGuidance(required(payload)?)),
            other => Err(RequestDecodeError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::str::FromStr for Request {
    type Err = RequestDecodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::decode(raw)
    }
}
