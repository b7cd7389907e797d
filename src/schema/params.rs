use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseParamError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl ParseParamError {
    fn new(kind: &'static str, value: &str, keys: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: keys.join(", "),
        }
    }
}

/// Genre of a story. Selects the name and setting banks. Unknown keys
/// parse as `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    #[default]
    General,
    Fantasy,
    Scifi,
    Mystery,
}

impl Genre {
    pub const ALL: [Genre; 4] = [Self::General, Self::Fantasy, Self::Scifi, Self::Mystery];

    /// Bank key for this genre (e.g., "scifi").
    pub fn key(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Fantasy => "fantasy",
            Self::Scifi => "scifi",
            Self::Mystery => "mystery",
        }
    }
}

/// Narrative tone. Selects the opener and adjective lists of the style pass.
/// Unknown keys parse as `Serious`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Warm,
    Dark,
    Whimsical,
    #[default]
    Serious,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Self::Warm, Self::Dark, Self::Whimsical, Self::Serious];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Dark => "dark",
            Self::Whimsical => "whimsical",
            Self::Serious => "serious",
        }
    }
}

/// Desired story length category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl StoryLength {
    pub const ALL: [StoryLength; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Candidate sentences generated per beat before filtering.
    pub fn target_sentences(&self) -> usize {
        match self {
            Self::Short => 3,
            Self::Medium => 5,
            Self::Long => 7,
        }
    }
}

/// Reads a key from a bare identifier (RON) or a string (JSON) and hands it
/// to a `FromStr` that never fails.
struct LenientKey<T>(PhantomData<T>);

impl<'de, T: FromStr<Err = Infallible>> Visitor<'de> for LenientKey<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a key")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<T, E> {
        match value.parse() {
            Ok(parsed) => Ok(parsed),
            Err(never) => match never {},
        }
    }
}

macro_rules! keyed_enum_impls {
    ($ty:ident) => {
        impl $ty {
            fn from_key(s: &str) -> Option<Self> {
                let wanted = s.trim().to_lowercase();
                $ty::ALL.into_iter().find(|item| item.key() == wanted)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
    ($ty:ident, $kind:literal) => {
        keyed_enum_impls!($ty);

        impl FromStr for $ty {
            type Err = ParseParamError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::from_key(s).ok_or_else(|| {
                    let keys: Vec<&str> = $ty::ALL.iter().map(|item| item.key()).collect();
                    ParseParamError::new($kind, s, &keys)
                })
            }
        }
    };
    ($ty:ident, fallback = $fallback:ident) => {
        keyed_enum_impls!($ty);

        impl FromStr for $ty {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($ty::from_key(s).unwrap_or($ty::$fallback))
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_identifier(LenientKey(PhantomData))
            }
        }
    };
}

keyed_enum_impls!(Genre, fallback = General);
keyed_enum_impls!(Tone, fallback = Serious);
keyed_enum_impls!(StoryLength, "length");

/// The plain parameter bundle a frontend hands to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryParams {
    pub genre: Genre,
    pub tone: Tone,
    pub length: StoryLength,
    /// Fixed seed for reproducible output. Drawn from entropy when absent.
    pub seed: Option<u64>,
    pub title_hint: Option<String>,
    /// Ask the injected text backend for beat sentences.
    pub use_backend: bool,
    /// End the last paragraph on a calm line.
    pub calm_closure: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for genre in Genre::ALL {
            assert_eq!(genre.key().parse::<Genre>().unwrap(), genre);
        }
        for tone in Tone::ALL {
            assert_eq!(tone.to_string().parse::<Tone>().unwrap(), tone);
        }
        assert_eq!(" LONG ".parse::<StoryLength>().unwrap(), StoryLength::Long);
    }

    #[test]
    fn unknown_value_lists_choices() {
        let err = "epic".parse::<StoryLength>().unwrap_err();
        assert_eq!(err.kind, "length");
        assert_eq!(err.expected, "short, medium, long");
        assert!(err.to_string().contains("epic"));
    }

    #[test]
    fn target_sentences_by_length() {
        assert_eq!(StoryLength::Short.target_sentences(), 3);
        assert_eq!(StoryLength::Medium.target_sentences(), 5);
        assert_eq!(StoryLength::Long.target_sentences(), 7);
    }

    #[test]
    fn params_defaults() {
        let params = StoryParams::default();
        assert_eq!(params.genre, Genre::General);
        assert_eq!(params.tone, Tone::Serious);
        assert_eq!(params.length, StoryLength::Medium);
        assert!(params.seed.is_none());
        assert!(!params.use_backend);
    }

    #[test]
    fn params_from_partial_ron() {
        let params: StoryParams =
            ron::from_str("(genre: scifi, length: short, seed: Some(7))").unwrap();
        assert_eq!(params.genre, Genre::Scifi);
        assert_eq!(params.length, StoryLength::Short);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.tone, Tone::Serious);
    }

    #[test]
    fn unknown_genre_and_tone_fall_back() {
        assert_eq!("horror".parse::<Genre>().unwrap(), Genre::General);
        assert_eq!("".parse::<Genre>().unwrap(), Genre::General);
        assert_eq!("gentle".parse::<Tone>().unwrap(), Tone::Serious);
        assert_eq!(" Dark ".parse::<Tone>().unwrap(), Tone::Dark);
    }

    #[test]
    fn unknown_genre_and_tone_fall_back_in_json() {
        let params: StoryParams =
            serde_json::from_str(r#"{"genre": "horror", "tone": "gentle", "seed": 1}"#).unwrap();
        assert_eq!(params.genre, Genre::General);
        assert_eq!(params.tone, Tone::Serious);
        assert_eq!(params.seed, Some(1));

        let params: StoryParams =
            serde_json::from_str(r#"{"genre": "Fantasy", "tone": "warm"}"#).unwrap();
        assert_eq!(params.genre, Genre::Fantasy);
        assert_eq!(params.tone, Tone::Warm);
    }

    #[test]
    fn unknown_genre_falls_back_in_ron() {
        let params: StoryParams = ron::from_str("(genre: western, tone: dark)").unwrap();
        assert_eq!(params.genre, Genre::General);
        assert_eq!(params.tone, Tone::Dark);
    }

    #[test]
    fn unknown_length_is_still_an_error_in_json() {
        let result: Result<StoryParams, _> = serde_json::from_str(r#"{"length": "epic"}"#);
        assert!(result.is_err());
    }
}
