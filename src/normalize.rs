//! Text normalization for names and fund labels
//!
//! Two strengths:
//! - [`normalize`]: accent-free, upper-case, trimmed. Used for display keys.
//! - [`Normalizer::normalize_for_matching`]: additionally deletes a blacklist
//!   of tokens (spaces, punctuation, company suffixes) so that
//!   `"Fundo ABC S.A."` and `"FUNDO ABC SA"` collapse to the same key.
//!
//! Both are total and idempotent.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Tokens removed by the matching normalizer, in removal order
pub const DEFAULT_MATCH_TOKENS: [&str; 6] = [" ", ".", "/", "-", "SA", "LTDA"];

/// Decompose and drop combining marks ("Ação" -> "Acao")
pub fn strip_accents(input: &str) -> String {
    input.nfkd().filter(|ch| !is_combining_mark(*ch)).collect()
}

/// Upper-case, accent-free, trimmed form of `input`.
///
/// Accents are stripped again after upper-casing: a few lower-case letters
/// upper-case into a base letter plus a combining mark.
pub fn normalize(input: &str) -> String {
    let upper = strip_accents(input).to_uppercase();
    strip_accents(&upper).trim().to_string()
}

/// Matching-key normalizer with an injectable token blacklist
#[derive(Debug, Clone)]
pub struct Normalizer {
    tokens: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_TOKENS)
    }
}

impl Normalizer {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| normalize_token(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Normalization used for join keys.
    ///
    /// Tokens are removed in list order, case-insensitively, as literal
    /// substrings. Removing one token can splice a new one together
    /// (`"SSAA"` -> `"SA"`), so removal repeats until nothing changes.
    pub fn normalize_for_matching(&self, input: &str) -> String {
        let mut current = normalize(input);
        loop {
            let mut next = current.clone();
            for token in &self.tokens {
                next = next.replace(token.as_str(), "");
            }
            let next = strip_accents(&next).trim().to_string();
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

/// Tokens are compared against already-normalized text, so they get the
/// same case folding. Whitespace tokens must survive the trim.
fn normalize_token(token: &str) -> String {
    if token.trim().is_empty() {
        token.to_string()
    } else {
        normalize(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  joão da silva "), "JOAO DA SILVA");
        assert_eq!(normalize("Movimentação"), "MOVIMENTACAO");
        assert_eq!(normalize("ÂNGELA"), "ANGELA");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_keeps_inner_spacing() {
        assert_eq!(normalize("john  doe"), "JOHN  DOE");
    }

    #[test]
    fn test_matching_removes_tokens() {
        let n = Normalizer::default();
        assert_eq!(n.normalize_for_matching("Fundo ABC S.A."), "FUNDOABC");
        assert_eq!(n.normalize_for_matching("Comércio Ltda."), "COMERCIO");
        assert_eq!(n.normalize_for_matching("john  doe"), "JOHNDOE");
        assert_eq!(n.normalize_for_matching("JOHN DOE"), "JOHNDOE");
        assert_eq!(n.normalize_for_matching("12.345.678/0001-90"), "12345678000190");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let n = Normalizer::default();
        assert_eq!(
            n.normalize_for_matching("empresa sa"),
            n.normalize_for_matching("EMPRESA SA")
        );
        assert_eq!(n.normalize_for_matching("empresa ltda"), "EMPRE");
    }

    #[test]
    fn test_matching_reaches_fixpoint() {
        let n = Normalizer::default();
        assert_eq!(n.normalize_for_matching("SSAA"), "");
        assert_eq!(n.normalize_for_matching("SLTDAA"), "");
    }

    #[test]
    fn test_custom_tokens() {
        let n = Normalizer::new(["-", "me"]);
        assert_eq!(n.tokens(), &["-".to_string(), "ME".to_string()]);
        assert_eq!(n.normalize_for_matching("acme-corp me"), "ACCORP");
    }

    #[test]
    fn test_idempotence() {
        let n = Normalizer::default();
        let samples = [
            "Fundo ABC S.A.",
            "  joão  da silva ltda ",
            "SSAA",
            "ǰ ŉ ß ﬁ ㎏",
            "Ação/Crédito - Sá",
            "",
            "\t\n",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {:?}", s);

            let once = n.normalize_for_matching(s);
            assert_eq!(
                n.normalize_for_matching(&once),
                once,
                "normalize_for_matching not idempotent for {:?}",
                s
            );
        }
    }
}
