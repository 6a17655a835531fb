use crate::models::{Guidance, Song};

pub const NO_RESULTS_SENTINEL: &str = "NO_MATCHING_SONGS";
pub const FALLBACK_VERSE: &str = "Could not find a fitting Bible verse.";
pub const FALLBACK_REFLECTION: &str = "Could not prepare a spiritual reflection.";

/// Every song as a title/lyrics block, separated by `---`.
pub fn serialize_corpus<'a>(songs: impl IntoIterator<Item = &'a Song>) -> String {
    songs
        .into_iter()
        .map(|song| format!("Title: {}\nLyrics:\n{}\n---", song.title, song.lyrics))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn semantic_search_prompt<'a>(query: &str, songs: impl IntoIterator<Item = &'a Song>) -> String {
    let corpus = serialize_corpus(songs);
    format!(
        "You are an assistant that finds songs in a database of church songs.\n\
         \n\
         The user's request: \"{query}\"\n\
         \n\
         All songs in the database:\n\
         \n\
         {corpus}\n\
         \n\
         Find the songs that best match the request. A match may come from:\n\
         1. The song title\n\
         2. Words from the lyrics\n\
         3. The theme or meaning of the song\n\
         4. Its biblical context\n\
         \n\
         Answer format:\n\
         1. List the songs found, ordered by relevance\n\
         2. For every song give its exact title and a short reason why it fits the request\n\
         3. If no song fits, answer with exactly {NO_RESULTS_SENTINEL} and nothing else\n\
         4. Do not use markdown; use paragraphs and emoji\n\
         \n\
         Answer in the language of the request. Be brief and to the point."
    )
}

pub fn guidance_prompt(song: &Song) -> String {
    format!(
        "Analyse the following song titled '{}' with the lyrics:\n\n{}\n\n\
         Do two things:\n\
         1. Find a Bible verse that matches the theme of this song\n\
         2. Write a spiritual reflection in the style of a thoughtful sermon\n\n\
         Split the answer into two parts separated by a blank line: first the \
         reflection, then the Bible verse. Do not use markdown.",
        song.title, song.lyrics
    )
}

/// True when the model answered with the no-results sentinel.
pub fn is_no_results(answer: &str) -> bool {
    answer.trim().trim_matches('.') == NO_RESULTS_SENTINEL
}

/// Splits a guidance answer on its first blank line.
pub fn parse_guidance(answer: &str) -> Guidance {
    let answer = answer.trim();
    match answer.split_once("\n\n") {
        Some((reflection, verse)) if !verse.trim().is_empty() => Guidance {
            reflection: reflection.trim().to_string(),
            verse: verse.trim().to_string(),
        },
        _ => Guidance {
            reflection: answer.to_string(),
            verse: FALLBACK_VERSE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::fixtures::{hymns, song};

    #[test]
    fn corpus_lists_every_song_in_catalogue_order() {
        let catalogue = hymns();
        let corpus = serialize_corpus(catalogue.songs());

        let first = corpus.find("Title: 1000 Tongues").expect("title present");
        let last = corpus.find("Title: How Great").expect("title present");
        assert!(first < last);
        assert_eq!(corpus.matches("---").count(), catalogue.song_count());
    }

    #[test]
    fn search_prompt_embeds_query_corpus_and_contract() {
        let catalogue = hymns();
        let prompt = semantic_search_prompt("songs about mercy", catalogue.songs());

        assert!(prompt.contains("\"songs about mercy\""));
        assert!(prompt.contains("Amazing grace how sweet the sound"));
        assert!(prompt.contains(NO_RESULTS_SENTINEL));
        assert!(prompt.contains("Do not use markdown"));
    }

    #[test]
    fn sentinel_detection_tolerates_whitespace() {
        assert!(is_no_results("  NO_MATCHING_SONGS.\n"));
        assert!(!is_no_results("1. Amazing Grace"));
    }

    #[test]
    fn guidance_splits_on_first_blank_line() {
        let guidance = parse_guidance("Grace finds us.\nAlways.\n\nEphesians 2:8\n\nextra");
        assert_eq!(guidance.reflection, "Grace finds us.\nAlways.");
        assert_eq!(guidance.verse, "Ephesians 2:8\n\nextra");
    }

    #[test]
    fn single_part_guidance_gets_fallback_verse() {
        let guidance = parse_guidance("Only a reflection.");
        assert_eq!(guidance.reflection, "Only a reflection.");
        assert_eq!(guidance.verse, FALLBACK_VERSE);
    }

    #[test]
    fn guidance_prompt_names_the_song() {
        let prompt = guidance_prompt(&song("Be Still", "be still my soul"));
        assert!(prompt.contains("'Be Still'"));
        assert!(prompt.contains("be still my soul"));
    }
}
