// Key normalization and candidate generation — resilient to prefix
// differences between environments (objects uploaded with or without a
// leading `media/` directory).

use percent_encoding::percent_decode_str;

/// Outcome of defensively percent-decoding a raw path fragment.
///
/// Malformed escape sequences must not fail the request; the raw string is
/// carried through instead and the bucket's own existence check decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedKey {
    Decoded(String),
    Raw(String),
}

impl DecodedKey {
    pub fn as_str(&self) -> &str {
        match self {
            DecodedKey::Decoded(s) | DecodedKey::Raw(s) => s,
        }
    }

    pub fn into_inner(self) -> String {
        match self {
            DecodedKey::Decoded(s) | DecodedKey::Raw(s) => s,
        }
    }
}

/// Turn a raw URL path fragment into a canonical storage key: strip leading
/// slashes, then percent-decode, falling back to the raw string when the
/// decoded bytes are not valid UTF-8.
pub fn normalize_key(raw: &str) -> DecodedKey {
    let trimmed = raw.trim_start_matches('/');
    match percent_decode_str(trimmed).decode_utf8() {
        Ok(decoded) => DecodedKey::Decoded(decoded.into_owned()),
        Err(_) => DecodedKey::Raw(trimmed.to_string()),
    }
}

/// One rule producing a candidate storage key from a normalized key, or
/// `None` when the rule does not apply. Rules are pure; extending resolution
/// means adding a rule here, not touching the lookup loop.
type CandidateRule = fn(&str, &str) -> Option<String>;

fn exact(key: &str, _prefix: &str) -> Option<String> {
    Some(key.to_string())
}

fn with_prefix(key: &str, prefix: &str) -> Option<String> {
    Some(format!("{}/{}", prefix, strip_prefix(key, prefix)))
}

fn without_prefix(key: &str, prefix: &str) -> Option<String> {
    key.starts_with(&format!("{}/", prefix))
        .then(|| strip_prefix(key, prefix).to_string())
}

const CANDIDATE_RULES: &[CandidateRule] = &[exact, with_prefix, without_prefix];

fn strip_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(key)
}

/// Candidate storage keys for a normalized key, in priority order,
/// de-duplicated and with empty candidates dropped.
pub fn candidate_keys(key: &str, prefix: &str) -> Vec<String> {
    let key = key.trim_start_matches('/');
    let mut candidates: Vec<String> = Vec::with_capacity(CANDIDATE_RULES.len());
    for rule in CANDIDATE_RULES {
        if let Some(candidate) = rule(key, prefix) {
            if !candidate.is_empty() && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_slashes() {
        assert_eq!(
            normalize_key("//phantom-love/01-intro.mp3"),
            DecodedKey::Decoded("phantom-love/01-intro.mp3".to_string())
        );
    }

    #[test]
    fn test_normalize_percent_decodes() {
        assert_eq!(
            normalize_key("phantom%20love/01%20intro.mp3"),
            DecodedKey::Decoded("phantom love/01 intro.mp3".to_string())
        );
    }

    #[test]
    fn test_normalize_falls_back_on_invalid_utf8() {
        // %FF decodes to a byte that is not valid UTF-8 on its own.
        assert_eq!(
            normalize_key("bad%FFkey"),
            DecodedKey::Raw("bad%FFkey".to_string())
        );
    }

    #[test]
    fn test_normalize_keeps_stray_percent() {
        // A lone `%` is passed through by the decoder, not an error.
        assert_eq!(
            normalize_key("50%-off.mp3"),
            DecodedKey::Decoded("50%-off.mp3".to_string())
        );
    }

    #[test]
    fn test_candidates_without_prefix() {
        assert_eq!(
            candidate_keys("phantom-love/01-intro.mp3", "media"),
            vec![
                "phantom-love/01-intro.mp3".to_string(),
                "media/phantom-love/01-intro.mp3".to_string(),
            ]
        );
    }

    #[test]
    fn test_candidates_with_prefix_already_present() {
        assert_eq!(
            candidate_keys("media/phantom-love/01-intro.mp3", "media"),
            vec![
                "media/phantom-love/01-intro.mp3".to_string(),
                "phantom-love/01-intro.mp3".to_string(),
            ]
        );
    }

    #[test]
    fn test_candidates_deduplicate_preserving_order() {
        let candidates = candidate_keys("cover.png", "media");
        assert_eq!(candidates, vec!["cover.png", "media/cover.png"]);
    }

    #[test]
    fn test_candidates_drop_empty() {
        let candidates = candidate_keys("media/", "media");
        assert!(candidates.iter().all(|c| !c.is_empty()));
    }
}
