//! Text normalization applied before any pattern matching.

use std::sync::LazyLock;

use regex::Regex;

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));
static SYNONYM_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b(?:paid|purchase|bought)\b"));
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"₹|\brs\.?"));

fn compile(pattern: &str) -> Regex {
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("static pattern must compile")
}

/// Normalizes a raw chat line: trim, lowercase, collapse whitespace runs,
/// fold the spend synonyms to `spent` and the rupee tokens to `inr`.
///
/// Pure string transform; the classifier only ever sees normalized text.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = SPACE_RE.replace_all(&lowered, " ");
    let folded = SYNONYM_RE.replace_all(&collapsed, "spent");
    CURRENCY_RE.replace_all(&folded, "inr").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(
            normalize("  Spent   1200 on  GROCERIES from hdfc card "),
            "spent 1200 on groceries from hdfc card"
        );
    }

    #[test]
    fn folds_spend_synonyms() {
        assert_eq!(normalize("paid 100 on rent from sbi account"), "spent 100 on rent from sbi account");
        assert_eq!(normalize("bought 100 on snacks from wallet cash"), "spent 100 on snacks from wallet cash");
        assert_eq!(normalize("Purchase 100 on fuel from hdfc card"), "spent 100 on fuel from hdfc card");
    }

    #[test]
    fn folds_currency_tokens() {
        assert_eq!(normalize("spent 100 rs on tea from wallet cash"), "spent 100 inr on tea from wallet cash");
        assert_eq!(normalize("spent 100 Rs. on tea from wallet cash"), "spent 100 inr on tea from wallet cash");
        assert_eq!(normalize("spent 100 ₹ on tea from wallet cash"), "spent 100 inr on tea from wallet cash");
    }

    #[test]
    fn leaves_embedded_words_alone() {
        // `cards` must not become `cainr`.
        assert_eq!(normalize("list cards"), "list cards");
        assert_eq!(normalize("show accounts"), "show accounts");
    }
}
