// ============================================================
// Layer 4 — Sentence Preprocessor
// ============================================================
// Turns a raw corpus sentence into a list of tokens.
//
// Steps (applied in order):
//   1. Replace Unicode whitespace variants and control characters
//      with a plain space
//   2. Lowercase (optional, on by default)
//   3. Split on whitespace
//   4. Peel punctuation off the edges of each word into its own
//      token, and split English clitics ('s, 've, n't, 're, 'd, 'll)
//
// Example:
//   "The dog's bowl (empty)."
//   → ["the", "dog", "'s", "bowl", "(", "empty", ")", "."]

const CLITICS: [&str; 6] = ["n't", "'s", "'ve", "'re", "'d", "'ll"];

#[derive(Debug, Clone)]
pub struct Preprocessor {
    lowercase: bool,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self { lowercase: true }
    }

    /// Keep the original casing of every token
    pub fn preserve_case(mut self) -> Self {
        self.lowercase = false;
        self
    }

    /// Normalise whitespace and control characters, collapse runs of
    /// spaces and trim.
    pub fn clean(&self, text: &str) -> String {
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\t' | '\r' | '\n' => ' ',
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();

        let collapsed = normalised.split_whitespace().collect::<Vec<_>>().join(" ");

        if self.lowercase {
            collapsed.to_lowercase()
        } else {
            collapsed
        }
    }

    /// Clean `text` and split it into tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        let mut tokens = Vec::new();

        for word in cleaned.split_whitespace() {
            split_word(word, &mut tokens);
        }

        tokens
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split one whitespace-delimited word into leading punctuation,
/// the core (with any clitic separated), and trailing punctuation.
fn split_word(word: &str, out: &mut Vec<String>) {
    let is_edge = |c: char| c.is_ascii_punctuation() && c != '\'';

    let without_leading = word.trim_start_matches(is_edge);
    let core            = without_leading.trim_end_matches(is_edge);
    let leading         = &word[..word.len() - without_leading.len()];
    let trailing        = &without_leading[core.len()..];

    out.extend(leading.chars().map(String::from));

    if !core.is_empty() {
        match CLITICS.iter().find(|cl| core.len() > cl.len() && core.ends_with(*cl)) {
            Some(cl) => {
                out.push(core[..core.len() - cl.len()].to_string());
                out.push((*cl).to_string());
            }
            None => out.push(core.to_string()),
        }
    }

    out.extend(trailing.chars().map(String::from));
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_lowercases() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  Hello \t  World\n"), "hello world");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_splits_edge_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(
            p.tokenize("The bowl (empty)."),
            vec!["the", "bowl", "(", "empty", ")", "."]
        );
    }

    #[test]
    fn test_splits_clitics() {
        let p = Preprocessor::new();
        assert_eq!(p.tokenize("dog's"), vec!["dog", "'s"]);
        assert_eq!(p.tokenize("don't"), vec!["do", "n't"]);
    }

    #[test]
    fn test_keeps_inner_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(p.tokenize("a well-lit room"), vec!["a", "well-lit", "room"]);
    }

    #[test]
    fn test_preserve_case() {
        let p = Preprocessor::new().preserve_case();
        assert_eq!(p.tokenize("New York"), vec!["New", "York"]);
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert!(p.tokenize("   ").is_empty());
    }
}
