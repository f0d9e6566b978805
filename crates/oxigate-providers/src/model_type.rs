//! Model type inference — guesses a model's capability from its id.
//!
//! The keyword tables are data: ordered by priority and versioned, so a
//! change in classification shows up as a change here and in the tests.
//! Explicit `type` settings in the config always win over this heuristic.

use std::fmt;
use std::str::FromStr;

/// The capability a model id is bound as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelType {
    Completer,
    Embedder,
    Renderer,
    Synthesizer,
    Transcriber,
    /// No keyword matched.
    Auto,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Completer => "completer",
            ModelType::Embedder => "embedder",
            ModelType::Renderer => "renderer",
            ModelType::Synthesizer => "synthesizer",
            ModelType::Transcriber => "transcriber",
            ModelType::Auto => "auto",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completer" => Ok(ModelType::Completer),
            "embedder" => Ok(ModelType::Embedder),
            "renderer" => Ok(ModelType::Renderer),
            "synthesizer" => Ok(ModelType::Synthesizer),
            "transcriber" => Ok(ModelType::Transcriber),
            "auto" | "" => Ok(ModelType::Auto),
            other => Err(format!("invalid model type: {other}")),
        }
    }
}

// ─────────────────────────────────────────────
// Keyword tables
// ─────────────────────────────────────────────

/// Bumped whenever a table or the priority order changes.
pub const KEYWORD_TABLES_VERSION: u32 = 1;

/// Keywords (lowercase) that identify one capability.
#[derive(Debug)]
pub struct KeywordTable {
    pub kind: ModelType,
    pub keywords: &'static [&'static str],
}

/// All tables, in priority order. The first table with a match wins.
pub static KEYWORD_TABLES: &[KeywordTable] = &[
    KeywordTable {
        kind: ModelType::Completer,
        keywords: &[
            "aya",
            "claude",
            "codestral",
            "command",
            "deepseek",
            "dolphin",
            "falcon",
            "gemini",
            "gemma",
            "gpt",
            "hermes",
            "llama",
            "llava",
            "mistral",
            "mixtral",
            "orca",
            "phi",
            "qwen",
            "stable-code",
            "stablelm",
            "starcoder",
            "vicuna",
            "wizardlm",
            "zephyr",
        ],
    },
    KeywordTable {
        kind: ModelType::Embedder,
        keywords: &["bge", "embed", "gte", "minilm"],
    },
    KeywordTable {
        kind: ModelType::Renderer,
        keywords: &["dall-e", "sd-turbo", "sdxl", "stable-diffusion"],
    },
    KeywordTable {
        kind: ModelType::Synthesizer,
        keywords: &["stable-audio", "tts"],
    },
    KeywordTable {
        kind: ModelType::Transcriber,
        keywords: &["whisper"],
    },
];

/// Classify a free-form model id by case-insensitive substring match.
pub fn detect_model_type(id: &str) -> ModelType {
    let id_lower = id.to_lowercase();
    KEYWORD_TABLES
        .iter()
        .find(|table| table.keywords.iter().any(|kw| id_lower.contains(kw)))
        .map_or(ModelType::Auto, |table| table.kind)
}

/// Resolve the type of a model entry: explicit setting first, then inference.
pub fn resolve_model_type(id: &str, explicit: Option<&str>) -> Result<ModelType, String> {
    match explicit {
        Some(raw) => match raw.parse::<ModelType>()? {
            ModelType::Auto => Ok(detect_model_type(id)),
            kind => Ok(kind),
        },
        None => Ok(detect_model_type(id)),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_completer() {
        assert_eq!(detect_model_type("gpt-4o"), ModelType::Completer);
        assert_eq!(detect_model_type("Meta-Llama-3-8B"), ModelType::Completer);
    }

    #[test]
    fn test_detect_embedder() {
        assert_eq!(detect_model_type("text-embedding-3-small"), ModelType::Embedder);
        assert_eq!(detect_model_type("BAAI/bge-large"), ModelType::Embedder);
    }

    #[test]
    fn test_detect_renderer() {
        assert_eq!(detect_model_type("dall-e-3"), ModelType::Renderer);
        assert_eq!(detect_model_type("sdxl-lightning"), ModelType::Renderer);
    }

    #[test]
    fn test_detect_synthesizer() {
        assert_eq!(detect_model_type("tts-1-hd"), ModelType::Synthesizer);
    }

    #[test]
    fn test_detect_transcriber() {
        assert_eq!(detect_model_type("whisper-1"), ModelType::Transcriber);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(detect_model_type("WHISPER-LARGE"), ModelType::Transcriber);
        assert_eq!(detect_model_type("Mistral-7B"), ModelType::Completer);
    }

    #[test]
    fn test_two_tables_higher_priority_wins() {
        // completer ("llama") beats embedder ("embed")
        assert_eq!(detect_model_type("llama-embed"), ModelType::Completer);
        // embedder ("minilm") beats transcriber ("whisper")
        assert_eq!(detect_model_type("minilm-whisper"), ModelType::Embedder);
        // renderer ("sdxl") beats synthesizer ("tts")
        assert_eq!(detect_model_type("sdxl-tts"), ModelType::Renderer);
    }

    #[test]
    fn test_no_match_is_auto() {
        assert_eq!(detect_model_type("my-custom-model"), ModelType::Auto);
        assert_eq!(detect_model_type(""), ModelType::Auto);
    }

    #[test]
    fn test_tables_in_priority_order() {
        let kinds: Vec<ModelType> = KEYWORD_TABLES.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ModelType::Completer,
                ModelType::Embedder,
                ModelType::Renderer,
                ModelType::Synthesizer,
                ModelType::Transcriber,
            ]
        );
        assert_eq!(KEYWORD_TABLES_VERSION, 1);
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for table in KEYWORD_TABLES {
            for kw in table.keywords {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }

    #[test]
    fn test_parse_model_type() {
        assert_eq!("Embedder".parse::<ModelType>().unwrap(), ModelType::Embedder);
        assert_eq!("auto".parse::<ModelType>().unwrap(), ModelType::Auto);
        assert!("painter".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_explicit_type_overrides_inference() {
        assert_eq!(
            resolve_model_type("gpt-image", Some("renderer")).unwrap(),
            ModelType::Renderer
        );
        assert_eq!(resolve_model_type("gpt-image", None).unwrap(), ModelType::Completer);
        assert_eq!(
            resolve_model_type("whisper-1", Some("auto")).unwrap(),
            ModelType::Transcriber
        );
        assert!(resolve_model_type("gpt-4o", Some("bogus")).is_err());
    }
}
