use once_cell::sync::Lazy;
use regex::Regex;

/// A clause followed by its run of Chinese terminal punctuation, or a
/// trailing clause with none.
static ZH_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^。！？!?…]*[。！？!?…]+|[^。！？!?…]+$").expect("valid regex"));

/// Latin-script sentence boundary: terminal punctuation plus whitespace
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("valid regex"));

/// Split Chinese text into sentences, keeping each terminal punctuation run
/// attached to the clause before it. Empty segments are dropped.
pub fn split_zh_sentences(text: &str) -> Vec<String> {
    ZH_SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sentence splitting used when the engine segments text itself
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_BOUNDARY.find_iter(text) {
        sentences.push(&text[last_end..mat.end()]);
        last_end = mat.end();
    }
    if last_end < text.len() {
        sentences.push(&text[last_end..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
