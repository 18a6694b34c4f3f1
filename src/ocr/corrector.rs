// 認識テキストの空白補正: 名前付き規則の表を順に、それぞれ変化しなくなるまで適用する

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// How a matched rule rewrites its captures.
#[derive(Debug, Clone, Copy)]
pub enum Rewrite {
    /// `regex` replacement template (`${1}${2} ${3}` style).
    Template(&'static str),
    /// Insert a space after the separator only when the captured prefix is
    /// a well-formed Roman numeral.
    RomanNumeral,
}

/// One correction rule.
#[derive(Debug)]
pub struct CorrectionRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub rewrite: Rewrite,
}

impl CorrectionRule {
    fn new(name: &'static str, pattern: &str, rewrite: Rewrite) -> Self {
        Self {
            name,
            // patterns are compile-time literals
            pattern: Regex::new(pattern).expect("invalid correction rule pattern"),
            rewrite,
        }
    }

    /// Apply the rule once over the whole string (non-overlapping matches).
    fn apply_once<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.rewrite {
            Rewrite::Template(template) => self.pattern.replace_all(text, template),
            Rewrite::RomanNumeral => self.pattern.replace_all(text, |caps: &Captures| {
                if is_valid_roman_numeral(&caps[1]) {
                    format!("{}{} {}", &caps[1], &caps[2], &caps[3])
                } else {
                    caps[0].to_string()
                }
            }),
        }
    }

    /// Apply the rule until the text no longer changes.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let next = self.apply_once(&current);
            if next == current {
                return current;
            }
            current = next.into_owned();
        }
    }
}

static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$")
        .expect("invalid roman numeral pattern")
});

static RULES: Lazy<Vec<CorrectionRule>> = Lazy::new(|| {
    use Rewrite::{RomanNumeral, Template};
    vec![
        // 1. "1.Overview" / "12:Item"
        CorrectionRule::new(
            "numeral_separator",
            r"^(\d{1,2})([.:])(\S)",
            Template("${1}${2} ${3}"),
        ),
        // 1b. "1 .Overview" -> "1. Overview"
        CorrectionRule::new(
            "numeral_spaced_separator",
            r"^(\d{1,2})\s+([.:])(\S)",
            Template("${1}${2} ${3}"),
        ),
        // 2. "IV.Summary"
        CorrectionRule::new(
            "roman_separator",
            r"(?i)^([IVXLCDM]{1,10})([.:])(\S)",
            RomanNumeral,
        ),
        // 3. "a.Item"
        CorrectionRule::new(
            "letter_separator",
            r"^([a-zA-Z])([.:])(\S)",
            Template("${1}${2} ${3}"),
        ),
        // 4. "(a)Note"
        CorrectionRule::new(
            "parenthesized_label",
            r"^(\([0-9a-zA-Z]+\))(\S)",
            Template("${1} ${2}"),
        ),
        // 5. "1.2.3.Intro", "100.5kg"
        CorrectionRule::new(
            "multilevel_label",
            r"^(\d+(?:\.\d+)*\.)(\S)",
            Template("${1} ${2}"),
        ),
        // 6. "(x)word", "word(x)"
        CorrectionRule::new(
            "close_paren_letter",
            r"(\([^)]+\))([a-zA-Z])",
            Template("${1} ${2}"),
        ),
        CorrectionRule::new(
            "alnum_open_paren",
            r"([a-zA-Z0-9])\(",
            Template("${1} ("),
        ),
        // 7. "word,word"
        CorrectionRule::new(
            "comma",
            r"([a-zA-Z0-9]),([a-zA-Z0-9])",
            Template("${1}, ${2}"),
        ),
        // 8. "Fig.3", "end.Next"
        CorrectionRule::new(
            "letter_dot_digit",
            r"([a-zA-Z])\.(\d)",
            Template("${1}. ${2}"),
        ),
        CorrectionRule::new(
            "sentence_boundary",
            r"([a-z])\.([A-Z])",
            Template("${1}. ${2}"),
        ),
        // 9. "see[1]and"
        CorrectionRule::new(
            "letter_open_bracket",
            r"([a-zA-Z])\[",
            Template("${1} ["),
        ),
        CorrectionRule::new(
            "close_bracket_letter",
            r"\]([a-zA-Z])",
            Template("] ${1}"),
        ),
        // 10. "Note:text", "one;two"
        CorrectionRule::new(
            "letter_colon_letter",
            r"([a-zA-Z]):([a-zA-Z])",
            Template("${1}: ${2}"),
        ),
        CorrectionRule::new(
            "letter_semicolon_letter",
            r"([a-zA-Z]);([a-zA-Z])",
            Template("${1}; ${2}"),
        ),
        // 11. "longword-otherword"
        CorrectionRule::new(
            "word_hyphen_word",
            r"([a-zA-Z]{3,})-([a-zA-Z]{3,})",
            Template("${1} - ${2}"),
        ),
    ]
});

/// The ordered rule table.
pub fn correction_rules() -> &'static [CorrectionRule] {
    &RULES
}

/// Run a single rule by name. Returns `None` for an unknown name.
pub fn apply_rule(name: &str, text: &str) -> Option<String> {
    RULES
        .iter()
        .find(|rule| rule.name == name)
        .map(|rule| rule.apply(text))
}

/// Check a string against the classical Roman numeral grammar
/// (case-insensitive). The empty string is not a numeral.
pub fn is_valid_roman_numeral(s: &str) -> bool {
    !s.is_empty() && ROMAN_NUMERAL.is_match(&s.to_ascii_uppercase())
}

/// Repair spacing and punctuation in one recognized string.
///
/// Empty and whitespace-only strings are returned unchanged.
pub fn correct_text(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    RULES
        .iter()
        .fold(text.to_string(), |current, rule| rule.apply(&current))
}
