//! Unit tests for the password strength classifier.

use rstest::rstest;

use redblue::services::password_strength::{get_strength, strength_score, PasswordStrength};

#[rstest]
#[case("", 0, PasswordStrength::Weak)]
#[case("short1", 1, PasswordStrength::Weak)]
#[case("abcdefgh", 0, PasswordStrength::Weak)]
#[case("abcdefghi", 1, PasswordStrength::Weak)]
#[case("abcdefghi1", 2, PasswordStrength::Medium)]
#[case("abcdefghi1!", 3, PasswordStrength::Strong)]
#[case("a1!", 2, PasswordStrength::Medium)]
#[case("123456789", 1, PasswordStrength::Weak)]
#[case("!!!!!!!!!", 2, PasswordStrength::Medium)]
#[case("pass word 1", 2, PasswordStrength::Medium)]
#[case("Tr0ub4dor&3", 3, PasswordStrength::Strong)]
fn test_strength_boundaries(
    #[case] secret: &str,
    #[case] score: u8,
    #[case] expected: PasswordStrength,
) {
    assert_eq!(strength_score(secret), score, "score for {secret:?}");
    assert_eq!(get_strength(secret), expected, "strength for {secret:?}");
}

#[rstest]
#[case('!')]
#[case('@')]
#[case('#')]
#[case('$')]
#[case('%')]
#[case('^')]
#[case('&')]
#[case('*')]
fn test_each_symbol_counts(#[case] symbol: char) {
    assert_eq!(strength_score(&symbol.to_string()), 1);
}

#[rstest]
#[case('-')]
#[case('_')]
#[case('?')]
#[case('(')]
fn test_other_punctuation_does_not_count(#[case] symbol: char) {
    assert_eq!(strength_score(&symbol.to_string()), 0);
}

#[test]
fn test_non_ascii_letters_do_not_pair_with_digits() {
    assert_eq!(strength_score("ü1"), 0);
}

#[test]
fn test_labels() {
    assert_eq!(PasswordStrength::Weak.label(), "Weak");
    assert_eq!(PasswordStrength::Medium.label(), "Medium");
    assert_eq!(PasswordStrength::Strong.label(), "Strong");
}
