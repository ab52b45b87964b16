//! The extraction engine.
//!
//! Input flows through four stages: markup flattening, whitespace
//! normalization, pattern matching (combined pairs first, positional zip as
//! fallback), and candidate sanitization. Every stage is total — malformed
//! input degrades to an empty result, never to a panic.

use keyhaven_core::CredentialCandidate;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Inputs shorter than this never contain a usable pair; skip the patterns.
const MIN_INPUT_LEN: usize = 100;

/// Length bounds applied to both identifier and secret tokens.
const MIN_TOKEN_LEN: usize = 3;
const MAX_TOKEN_LEN: usize = 64;

fn combined_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:user(?:name)?|login|email|account)\s*[:=]\s*(\S+)\s+(?:pass(?:word)?|pwd|secret)\s*[:=]\s*(\S+)",
        )
        .expect("valid regex")
    })
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:user(?:name)?|login|email|account)\s*[:=]\s*(\S+)")
            .expect("valid regex")
    })
}

fn secret_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:pass(?:word)?|pwd|secret)\s*[:=]\s*(\S+)").expect("valid regex")
    })
}

/// Labels and filler values that show up where real credentials would be.
const PLACEHOLDER_TOKENS: &[&str] = &[
    "username", "user", "login", "email", "account", "password", "pass", "pwd", "secret",
    "example", "changeme", "yourname", "yourpassword", "n/a", "none", "null", "tba", "soon",
];

/// Extract candidate credential pairs from raw page content.
///
/// Pure and deterministic: the same input always yields the same candidates,
/// in order of first appearance, deduplicated case-insensitively on
/// identifier. Inputs under 100 characters short-circuit to empty.
#[must_use]
pub fn extract(raw: &str) -> Vec<CredentialCandidate> {
    if raw.len() < MIN_INPUT_LEN {
        return Vec::new();
    }

    let text = normalize(&flatten_markup(raw));

    let mut pairs: Vec<CredentialCandidate> = Vec::new();
    let mut combined_matches = 0usize;

    for caps in combined_re().captures_iter(&text) {
        combined_matches += 1;
        let (Some(identifier), Some(secret)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        push_candidate(&mut pairs, identifier.as_str(), secret.as_str());
    }

    // No combined pairs at all: zip the two label streams positionally,
    // up to the shorter length.
    if combined_matches == 0 {
        let identifiers: Vec<&str> = identifier_re()
            .captures_iter(&text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        let secrets: Vec<&str> = secret_re()
            .captures_iter(&text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        for (identifier, secret) in identifiers.iter().zip(secrets.iter()) {
            push_candidate(&mut pairs, identifier, secret);
        }
    }

    dedupe(pairs)
}

/// Apply the same bounds, URL, and placeholder filters to candidates that
/// arrived pre-extracted (for example from a local helper process), so every
/// acquisition channel funnels through one gate.
#[must_use]
pub fn sanitize_candidates(candidates: Vec<CredentialCandidate>) -> Vec<CredentialCandidate> {
    let mut kept = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        push_candidate(&mut kept, &candidate.identifier, &candidate.secret);
    }
    dedupe(kept)
}

fn push_candidate(pairs: &mut Vec<CredentialCandidate>, identifier: &str, secret: &str) {
    let identifier = trim_token(identifier);
    let secret = trim_token(secret);
    if accept_token(identifier) && accept_token(secret) {
        pairs.push(CredentialCandidate::new(identifier, secret));
    } else {
        tracing::trace!("rejected candidate token pair");
    }
}

/// First occurrence wins, case-insensitive on identifier.
fn dedupe(pairs: Vec<CredentialCandidate>) -> Vec<CredentialCandidate> {
    let mut seen: HashSet<String> = HashSet::new();
    pairs
        .into_iter()
        .filter(|c| seen.insert(c.identifier.to_ascii_lowercase()))
        .collect()
}

/// Strip punctuation that the `\S+` value capture drags along.
fn trim_token(token: &str) -> &str {
    token
        .trim_start_matches(['(', '[', '"', '\'', '<'])
        .trim_end_matches([',', '.', ';', '!', '?', ')', ']', '"', '\'', '>'])
}

fn accept_token(token: &str) -> bool {
    if token.len() < MIN_TOKEN_LEN || token.len() > MAX_TOKEN_LEN {
        return false;
    }
    let lower = token.to_ascii_lowercase();
    if lower.contains("://") || lower.starts_with("http") || lower.starts_with("www.") {
        return false;
    }
    if PLACEHOLDER_TOKENS.contains(&lower.as_str()) {
        return false;
    }
    // A run of mask characters is a redaction, not a credential.
    if token.chars().all(|c| matches!(c, '*' | '•' | 'x' | 'X' | '-' | '_')) {
        return false;
    }
    true
}

/// Flatten HTML to its visible text. Non-markup input passes through
/// unchanged; malformed markup is handled by the parser's error recovery.
fn flatten_markup(raw: &str) -> String {
    if !(raw.contains('<') && raw.contains('>')) {
        return raw.to_string();
    }
    let document = Html::parse_document(raw);
    let mut text = String::with_capacity(raw.len() / 2);
    for chunk in document.root_element().text() {
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(chunk);
        }
    }
    text
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pad an input past the short-circuit threshold without adding labels.
    fn padded(body: &str) -> String {
        format!("Rotating shared accounts for this title, refreshed weekly by the curators. {body}")
    }

    #[test]
    fn test_under_length_inputs_are_empty() {
        for input in ["", "U", "Username: alpha Password: hunter22", "<html><p>hi"] {
            assert!(input.len() < MIN_INPUT_LEN);
            assert!(extract(input).is_empty());
        }
    }

    #[test]
    fn test_combined_pairs_order_preserving() {
        let input = padded(
            "Username: nightowl42 Password: Rq7!mv9z \
             Username: daysailor Password: k2#Wmfp0 \
             Username: thirdmate Password: zz9-Plural",
        );
        let candidates = extract(&input);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].identifier, "nightowl42");
        assert_eq!(candidates[1].identifier, "daysailor");
        assert_eq!(candidates[2].identifier, "thirdmate");
        assert_eq!(candidates[1].secret, "k2#Wmfp0");
    }

    #[test]
    fn test_case_insensitive_dedup_first_wins() {
        let input = padded(
            "Username: NightOwl42 Password: first-one \
             Username: nightowl42 Password: second-one",
        );
        let candidates = extract(&input);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "NightOwl42");
        assert_eq!(candidates[0].secret, "first-one");
    }

    #[test]
    fn test_label_variants() {
        let input = padded("login= coralskipper pass= Vb3!nn20 email: pilot@example.net pwd: Xk7?silent");
        let candidates = extract(&input);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].identifier, "coralskipper");
        assert_eq!(candidates[1].identifier, "pilot@example.net");
    }

    #[test]
    fn test_positional_zip_fallback() {
        // Identifiers and secrets in separate blocks; no identifier value is
        // immediately followed by a secret label, so the combined pass finds
        // nothing and the streams are zipped to the shorter length.
        let input = padded(
            "Login= alphaone then Login= bravotwo then Login= charliethree \
             listed above, secrets follow below the fold, \
             Pwd= red-fox-1 then Pwd= blue-owl-2",
        );
        let candidates = extract(&input);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].identifier, "alphaone");
        assert_eq!(candidates[0].secret, "red-fox-1");
        assert_eq!(candidates[1].identifier, "bravotwo");
        assert_eq!(candidates[1].secret, "blue-owl-2");
    }

    #[test]
    fn test_url_shaped_tokens_rejected() {
        let input = padded(
            "Username: https://tracker.example.com/u/99 Password: realenough9 \
             Username: keeper77 Password: www.lures.example",
        );
        let candidates = extract(&input);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_placeholder_tokens_rejected() {
        let input = padded("Username: username Password: password Username: account Password: changeme");
        assert!(extract(&input).is_empty());
    }

    #[test]
    fn test_length_bounds() {
        let oversized = "a".repeat(MAX_TOKEN_LEN + 1);
        let input = padded(&format!(
            "Username: ab Password: longenough1 Username: {oversized} Password: fine-secret2"
        ));
        assert!(extract(&input).is_empty());
    }

    #[test]
    fn test_masked_tokens_rejected() {
        let input = padded("Username: starpupil9 Password: ******** Username: xxxx Password: real-pw-77");
        let candidates = extract(&input);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_html_input_flattened() {
        let input = "<html><body><div class=\"entry\"><b>Username:</b> nightowl42</div>\
                     <div class=\"entry\"><b>Password:</b> Rq7!mv9z</div>\
                     <p>rotates friday</p></body></html>";
        let candidates = extract(input);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "nightowl42");
        assert_eq!(candidates[0].secret, "Rq7!mv9z");
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let input = padded("<div><<b>Username: okuser77 <p Password: okpass88 </div></span>>");
        let candidates = extract(&input);
        // Tolerant parse; extraction may or may not find the pair, but must
        // never panic and never invent extras.
        assert!(candidates.len() <= 1);
    }

    #[test]
    fn test_trailing_punctuation_trimmed() {
        let input = padded("Username: nightowl42, Password: \"Rq7!mv9z\".");
        let candidates = extract(&input);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "nightowl42");
        assert_eq!(candidates[0].secret, "Rq7!mv9z");
    }

    #[test]
    fn test_sanitize_candidates_filters_and_dedupes() {
        let raw = vec![
            CredentialCandidate::new("keeper77", "fine-secret2"),
            CredentialCandidate::new("KEEPER77", "other-secret"),
            CredentialCandidate::new("ab", "too-short-id"),
            CredentialCandidate::new("https://x.example/u", "url-shaped"),
            CredentialCandidate::new("password", "placeholder-id"),
        ];
        let kept = sanitize_candidates(raw);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identifier, "keeper77");
        assert_eq!(kept[0].secret, "fine-secret2");
    }

    #[test]
    fn test_no_match_is_normal_empty() {
        let input = padded("nothing here resembles a labelled pair of any kind whatsoever");
        assert!(extract(&input).is_empty());
    }
}
