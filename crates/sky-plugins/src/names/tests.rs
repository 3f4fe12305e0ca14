//! Unit tests for name validation.

use rstest::rstest;

use super::*;

#[rstest]
#[case::single_letter("a")]
#[case::with_hyphen("lint-extra")]
#[case::with_digits("fmt2")]
#[case::trailing_hyphen("tool-")]
#[case::max_length("a23456789012345678901234567890123456789012345678901234567890123")]
fn accepts_valid_names(#[case] name: &str) {
    assert!(validate_name(name).is_ok(), "{name} should be valid");
}

#[rstest]
#[case::empty("")]
#[case::uppercase("Lint")]
#[case::underscore("lint_extra")]
#[case::leading_hyphen("-lint")]
#[case::leading_digit("2fmt")]
#[case::dot("lint.wasm")]
#[case::slash("../etc")]
#[case::space("my tool")]
#[case::non_ascii("lïnt")]
#[case::too_long("a234567890123456789012345678901234567890123456789012345678901234")]
fn rejects_invalid_names(#[case] name: &str) {
    let err = validate_name(name).expect_err("name should be rejected");
    assert!(matches!(err, PluginError::InvalidName { .. }));
}

#[test]
fn max_length_boundary_is_sixty_three() {
    let ok = format!("a{}", "b".repeat(MAX_NAME_LEN - 1));
    let too_long = format!("a{}", "b".repeat(MAX_NAME_LEN));
    assert!(is_valid_name(&ok));
    assert!(!is_valid_name(&too_long));
}
