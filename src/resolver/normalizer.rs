//! Query Normalizer
//!
//! Splits a free-text street query into an optional street-type prefix
//! ("AVENIDA", "PLAZA", ...) and the remaining name fragment.

/// Street types recognised when no vocabulary is configured. Order matters:
/// the first token that prefixes the query wins.
pub const DEFAULT_STREET_TYPES: &[&str] = &[
    "CALLE",
    "AVENIDA",
    "PLAZA",
    "PASEO",
    "CAMINO",
    "PASAJE",
    "URB",
    "URBANIZACION",
    "RONDA",
    "CTRA",
    "TRAVESIA",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Recognised street type, in the vocabulary's (uppercase) spelling.
    pub type_token: Option<String>,
    pub residual_name: String,
}

#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    tokens: Vec<String>,
}

impl QueryNormalizer {
    /// Builds a normalizer over an ordered vocabulary. Tokens are trimmed and
    /// uppercased; blank tokens are dropped.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Never fails. Tokens are tried in vocabulary order and the first one that
    /// matches wins, so overlapping tokens resolve by position, not by length.
    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        let input = raw.trim();

        for token in &self.tokens {
            if let Some(rest) = strip_token(input, token) {
                return NormalizedQuery {
                    type_token: Some(token.clone()),
                    residual_name: rest.to_string(),
                };
            }
        }

        NormalizedQuery {
            type_token: None,
            residual_name: input.to_string(),
        }
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_STREET_TYPES)
    }
}

/// `Some(remainder)` when `input` starts with `token` (case-insensitive)
/// followed by whitespace.
fn strip_token<'a>(input: &'a str, token: &str) -> Option<&'a str> {
    let mut chars = input.chars();
    for expected in token.chars() {
        let actual = chars.next()?;
        if !actual.to_uppercase().eq(expected.to_uppercase()) {
            return None;
        }
    }

    let rest = chars.as_str();
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}
