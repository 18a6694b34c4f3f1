// Text spacing correction tests

use searchable_pdf::ocr::corrector::{
    apply_rule, correct_text, correction_rules, is_valid_roman_numeral,
};

// ============================================================
// 1. Whole-chain examples
// ============================================================

#[test]
fn test_correct_numbered_heading() {
    assert_eq!(correct_text("1.Overview"), "1. Overview");
    assert_eq!(correct_text("12:Item"), "12: Item");
}

#[test]
fn test_correct_roman_heading() {
    assert_eq!(correct_text("IV.Summary"), "IV. Summary");
    assert_eq!(correct_text("xii.appendix"), "xii. appendix");
}

#[test]
fn test_correct_parenthesized_label() {
    assert_eq!(correct_text("(a)Note"), "(a) Note");
}

#[test]
fn test_correct_comma() {
    assert_eq!(correct_text("word,word"), "word, word");
    assert_eq!(correct_text("a,b,c"), "a, b, c");
}

#[test]
fn test_correct_hyphenated_words() {
    assert_eq!(correct_text("longword-otherword"), "longword - otherword");
    assert_eq!(correct_text("abc-def-ghi"), "abc - def - ghi");
    // 短い単語の連結はそのまま
    assert_eq!(correct_text("e-mail"), "e-mail");
}

#[test]
fn test_correct_leaves_clean_text_alone() {
    let clean = "The quick brown fox jumps over the lazy dog.";
    assert_eq!(correct_text(clean), clean);
}

#[test]
fn test_correct_empty_and_whitespace() {
    assert_eq!(correct_text(""), "");
    assert_eq!(correct_text("   "), "   ");
}

#[test]
fn test_correct_non_ascii_passthrough() {
    assert_eq!(correct_text("日本語テキスト"), "日本語テキスト");
}

// ============================================================
// 2. Individual rules
// ============================================================

#[test]
fn test_rule_table_order() {
    let names: Vec<&str> = correction_rules().iter().map(|r| r.name).collect();
    assert_eq!(names.first(), Some(&"numeral_separator"));
    assert_eq!(names.last(), Some(&"word_hyphen_word"));
    assert!(names.contains(&"roman_separator"));
}

#[test]
fn test_rule_unknown_name() {
    assert_eq!(apply_rule("no_such_rule", "text"), None);
}

#[test]
fn test_rule_numeral_spaced_separator() {
    assert_eq!(
        apply_rule("numeral_spaced_separator", "1 .Overview").as_deref(),
        Some("1. Overview")
    );
}

#[test]
fn test_rule_roman_separator_requires_valid_numeral() {
    assert_eq!(
        apply_rule("roman_separator", "IV.Summary").as_deref(),
        Some("IV. Summary")
    );
    // IIII は正しいローマ数字ではない
    assert_eq!(
        apply_rule("roman_separator", "IIII.Summary").as_deref(),
        Some("IIII.Summary")
    );
}

#[test]
fn test_rule_multilevel_label() {
    assert_eq!(
        apply_rule("multilevel_label", "Intro").as_deref(),
        Some("Intro")
    );
    // 固定点まで繰り返すので、区切りごとに空白が入る
    assert_eq!(
        apply_rule("multilevel_label", "1.2.3.Intro").as_deref(),
        Some("1. 2. 3. Intro")
    );
    assert_eq!(
        apply_rule("multilevel_label", "100.5kg").as_deref(),
        Some("100. 5kg")
    );
}

#[test]
fn test_correct_multilevel_label() {
    assert_eq!(correct_text("100.5kg"), "100. 5kg");
    // 先頭2桁までの番号は先に numeral_separator が処理する
    assert_eq!(correct_text("1.2.3.Intro"), "1. 2.3.Intro");
}

#[test]
fn test_rule_parentheses() {
    assert_eq!(
        apply_rule("close_paren_letter", "(see)below").as_deref(),
        Some("(see) below")
    );
    assert_eq!(
        apply_rule("alnum_open_paren", "value(x)").as_deref(),
        Some("value (x)")
    );
}

#[test]
fn test_rule_sentence_and_figure_boundaries() {
    assert_eq!(
        apply_rule("sentence_boundary", "end.Next").as_deref(),
        Some("end. Next")
    );
    assert_eq!(
        apply_rule("letter_dot_digit", "Fig.3").as_deref(),
        Some("Fig. 3")
    );
}

#[test]
fn test_rule_brackets() {
    assert_eq!(
        apply_rule("letter_open_bracket", "see[1]").as_deref(),
        Some("see [1]")
    );
    assert_eq!(
        apply_rule("close_bracket_letter", "[1]and").as_deref(),
        Some("[1] and")
    );
}

#[test]
fn test_rule_colon_and_semicolon() {
    assert_eq!(
        apply_rule("letter_colon_letter", "Note:text").as_deref(),
        Some("Note: text")
    );
    assert_eq!(
        apply_rule("letter_semicolon_letter", "one;two").as_deref(),
        Some("one; two")
    );
}

// ============================================================
// 3. Roman numerals
// ============================================================

#[test]
fn test_roman_numeral_validation() {
    for valid in ["I", "IV", "ix", "XII", "MCMXCIV", "mmxxv"] {
        assert!(is_valid_roman_numeral(valid), "{valid} should be valid");
    }
    for invalid in ["", "IIII", "VV", "IC", "ABC"] {
        assert!(!is_valid_roman_numeral(invalid), "{invalid} should be invalid");
    }
}

// ============================================================
// 4. Idempotency
// ============================================================

#[test]
fn test_correct_is_idempotent() {
    let samples = [
        "1.Overview",
        "1 .Overview",
        "IV.Summary",
        "a.Item",
        "(a)Note",
        "1.2.3.Intro",
        "100.5kg",
        "123.4.5x",
        "value(x)and(y)more",
        "a,b,c,d",
        "Fig.3 shows end.Next",
        "see[1]and[2]also",
        "Note:text;more:stuff",
        "longword-otherword-thirdword",
        "  leading and trailing  ",
        "mixed 日本語,text",
    ];

    for sample in samples {
        let once = correct_text(sample);
        let twice = correct_text(&once);
        assert_eq!(once, twice, "correction should be idempotent for {sample:?}");
    }
}
