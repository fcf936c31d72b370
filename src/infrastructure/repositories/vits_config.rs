use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Shortest token sequence the exported VITS graphs accept
pub const DEFAULT_MIN_INPUT_TOKENS: usize = 5;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// The subset of a VITS training `config.json` needed at inference time
#[derive(Debug, Clone, Deserialize)]
pub struct VitsConfig {
    pub audio: AudioSection,
    pub characters: CharactersSection,
    #[serde(default)]
    pub add_blank: bool,
    #[serde(default)]
    pub enable_eos_bos_chars: bool,
    #[serde(default)]
    pub text_cleaner: Option<String>,
    /// Trained on phonemizer output rather than raw characters
    #[serde(default)]
    pub use_phonemes: bool,
    #[serde(default)]
    pub model_args: ModelArgs,
    #[serde(default)]
    pub min_input_tokens: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSection {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharactersSection {
    #[serde(default)]
    pub characters_class: Option<String>,
    #[serde(default)]
    pub pad: Option<String>,
    #[serde(default)]
    pub eos: Option<String>,
    #[serde(default)]
    pub bos: Option<String>,
    #[serde(default)]
    pub blank: Option<String>,
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub punctuations: String,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_sorted: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModelArgs {
    #[serde(default = "default_noise_scale")]
    pub inference_noise_scale: f32,
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,
    #[serde(default = "default_noise_scale_dp")]
    pub inference_noise_scale_dp: f32,
}

fn default_noise_scale() -> f32 {
    0.667
}

fn default_length_scale() -> f32 {
    1.0
}

fn default_noise_scale_dp() -> f32 {
    1.0
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self {
            inference_noise_scale: default_noise_scale(),
            length_scale: default_length_scale(),
            inference_noise_scale_dp: default_noise_scale_dp(),
        }
    }
}

impl VitsConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn min_input_tokens(&self) -> usize {
        self.min_input_tokens.unwrap_or(DEFAULT_MIN_INPUT_TOKENS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cleaner {
    /// Lowercase and collapse whitespace
    Basic,
    /// Collapse whitespace only
    Passthrough,
}

/// Grapheme tokenizer matching the vocabulary layout of the training config
#[derive(Debug, Clone)]
pub struct VitsTokenizer {
    ids: HashMap<char, i64>,
    pad_id: Option<i64>,
    blank_id: Option<i64>,
    bos_id: Option<i64>,
    eos_id: Option<i64>,
    add_blank: bool,
    use_eos_bos: bool,
    cleaner: Cleaner,
}

impl VitsTokenizer {
    pub fn from_config(config: &VitsConfig) -> Self {
        let chars = &config.characters;
        let vocab = build_vocab(chars);

        let mut ids = HashMap::new();
        for (index, token) in vocab.iter().enumerate() {
            let mut it = token.chars();
            if let (Some(c), None) = (it.next(), it.next()) {
                ids.entry(c).or_insert(index as i64);
            }
        }
        let position = |token: &Option<String>| {
            token
                .as_ref()
                .filter(|t| !t.is_empty())
                .and_then(|t| vocab.iter().position(|v| v == t))
                .map(|i| i as i64)
        };

        let cleaner = match config.text_cleaner.as_deref() {
            Some("no_cleaners") | Some("chinese_mandarin_cleaners") => Cleaner::Passthrough,
            _ => Cleaner::Basic,
        };

        Self {
            ids,
            pad_id: position(&chars.pad),
            blank_id: position(&chars.blank),
            bos_id: position(&chars.bos),
            eos_id: position(&chars.eos),
            add_blank: config.add_blank,
            use_eos_bos: config.enable_eos_bos_chars,
            cleaner,
        }
    }

    fn clean(&self, text: &str) -> String {
        let collapsed = WHITESPACE.replace_all(text.trim(), " ");
        match self.cleaner {
            Cleaner::Basic => collapsed.to_lowercase(),
            Cleaner::Passthrough => collapsed.into_owned(),
        }
    }

    /// Convert text to token ids. Characters outside the vocabulary are dropped.
    pub fn encode(&self, text: &str) -> Vec<i64> {
        let cleaned = self.clean(text);
        let mut tokens = Vec::with_capacity(cleaned.len());
        for c in cleaned.chars() {
            match self.ids.get(&c) {
                Some(&id) => tokens.push(id),
                None => tracing::debug!(character = %c, "Character not in vocabulary, discarding"),
            }
        }

        if self.add_blank {
            if let Some(blank) = self.blank_id.or(self.pad_id) {
                let mut interspersed = vec![blank; tokens.len() * 2 + 1];
                for (i, token) in tokens.into_iter().enumerate() {
                    interspersed[i * 2 + 1] = token;
                }
                tokens = interspersed;
            }
        }

        if self.use_eos_bos {
            if let Some(bos) = self.bos_id {
                tokens.insert(0, bos);
            }
            if let Some(eos) = self.eos_id {
                tokens.push(eos);
            }
        }

        tokens
    }
}

/// Vocabulary in model id order. VITS character sets put padding and
/// punctuation first and the blank last; the generic layout puts the special
/// tokens first and punctuation last.
fn build_vocab(chars: &CharactersSection) -> Vec<String> {
    let present = |token: &Option<String>| token.clone().filter(|t| !t.is_empty());
    let is_vits = chars
        .characters_class
        .as_deref()
        .map(|class| class.ends_with("VitsCharacters"))
        .unwrap_or(false);

    let mut vocab = Vec::new();
    if is_vits {
        vocab.extend(present(&chars.pad));
        vocab.extend(chars.punctuations.chars().map(String::from));
        vocab.extend(chars.characters.chars().map(String::from));
        vocab.extend(present(&chars.blank));
        return vocab;
    }

    let mut symbols: Vec<char> = chars.characters.chars().collect();
    if chars.is_unique {
        let mut seen = std::collections::HashSet::new();
        symbols.retain(|c| seen.insert(*c));
    }
    if chars.is_sorted {
        symbols.sort_unstable();
    }

    vocab.extend(present(&chars.pad));
    vocab.extend(present(&chars.eos));
    vocab.extend(present(&chars.bos));
    vocab.extend(present(&chars.blank));
    vocab.extend(symbols.into_iter().map(String::from));
    vocab.extend(chars.punctuations.chars().map(String::from));
    vocab
}
