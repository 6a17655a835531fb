use crate::catalogue::Catalogue;
use crate::models::{DispatcherOptions, Guidance, SearchMode, SearchOutcome, Song};
use crate::prompt::{
    guidance_prompt, is_no_results, parse_guidance, semantic_search_prompt, FALLBACK_REFLECTION,
    FALLBACK_VERSE,
};
use crate::traits::TextCompletion;
use crate::CollaboratorError;
use tracing::{error, info};

/// Songs whose title or lyrics contain `query`, ignoring case, in title order.
pub fn exact_matches<'a>(catalogue: &'a Catalogue, query: &str) -> Vec<&'a Song> {
    let needle = query.to_lowercase();
    if needle.trim().is_empty() {
        return Vec::new();
    }

    catalogue
        .songs()
        .filter(|song| {
            song.title.to_lowercase().contains(&needle) || song.lyrics.to_lowercase().contains(&needle)
        })
        .collect()
}

pub struct SearchDispatcher<C>
where
    C: TextCompletion,
{
    completion: C,
    options: DispatcherOptions,
}

impl<C> SearchDispatcher<C>
where
    C: TextCompletion + Send + Sync,
{
    pub fn new(completion: C) -> Self {
        Self::with_options(completion, DispatcherOptions::default())
    }

    pub fn with_options(completion: C, options: DispatcherOptions) -> Self {
        Self {
            completion,
            options,
        }
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    pub async fn search(&self, catalogue: &Catalogue, query: &str, mode: SearchMode) -> SearchOutcome {
        match mode {
            SearchMode::Exact => self.exact(catalogue, query),
            SearchMode::Semantic => self.semantic(catalogue, query).await,
        }
    }

    pub fn exact(&self, catalogue: &Catalogue, query: &str) -> SearchOutcome {
        let found = exact_matches(catalogue, query);
        info!(query = %query, matches = found.len(), "exact search");

        if found.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Matches(found.into_iter().cloned().collect())
        }
    }

    /// Asks the completion service to rank the whole catalogue. Failures
    /// come back as [`SearchOutcome::Failed`] with a readable message.
    pub async fn semantic(&self, catalogue: &Catalogue, query: &str) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::NoMatches;
        }

        let prompt = semantic_search_prompt(query, catalogue.songs());
        info!(query = %query, prompt_chars = prompt.len(), "semantic search");

        match self.call(&prompt).await {
            Ok(answer) if is_no_results(&answer) => SearchOutcome::NoMatches,
            Ok(answer) => SearchOutcome::Answer(answer),
            Err(CollaboratorError::TimedOut(limit)) => {
                error!(query = %query, timeout_secs = limit.as_secs(), "semantic search timed out");
                SearchOutcome::Failed(format!(
                    "Search timed out after {} seconds. Please try again.",
                    limit.as_secs()
                ))
            }
            Err(failure) => {
                error!(query = %query, error = %failure, "semantic search failed");
                SearchOutcome::Failed(format!("An error occurred while searching: {failure}"))
            }
        }
    }

    /// Reflection and Bible verse for a song. Never fails; a broken call
    /// yields fallback texts.
    pub async fn guidance(&self, song: &Song) -> Guidance {
        match self.call(&guidance_prompt(song)).await {
            Ok(answer) => parse_guidance(&answer),
            Err(failure) => {
                error!(title = %song.title, error = %failure, "guidance request failed");
                Guidance {
                    reflection: FALLBACK_REFLECTION.to_string(),
                    verse: FALLBACK_VERSE.to_string(),
                }
            }
        }
    }

    async fn call(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let limit = self.options.timeout;
        tokio::time::timeout(limit, self.completion.complete(prompt))
            .await
            .map_err(|_| CollaboratorError::TimedOut(limit))?
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use crate::traits::TextCompletion;
    use crate::CollaboratorError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) enum Behaviour {
        Answer(String),
        Fail,
        Hang,
    }

    pub(crate) struct FakeCompletion {
        behaviour: Behaviour,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl FakeCompletion {
        pub(crate) fn answering(text: &str) -> Self {
            Self::new(Behaviour::Answer(text.to_string()))
        }

        pub(crate) fn failing() -> Self {
            Self::new(Behaviour::Fail)
        }

        pub(crate) fn hanging() -> Self {
            Self::new(Behaviour::Hang)
        }

        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().map(|prompts| prompts.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextCompletion for FakeCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            match &self.behaviour {
                Behaviour::Answer(text) => Ok(text.clone()),
                Behaviour::Fail => Err(CollaboratorError::BackendResponse {
                    backend: "fake".to_string(),
                    details: "503 Service Unavailable".to_string(),
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }
}
