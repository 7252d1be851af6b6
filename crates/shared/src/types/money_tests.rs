use super::*;
use rstest::rstest;
use rust_decimal_macros::dec;
use std::str::FromStr;

#[rstest]
#[case(dec!(100), dec!(100.00))]
#[case(dec!(0.5), dec!(0.50))]
#[case(dec!(-12.34), dec!(-12.34))]
#[case(dec!(1.500), dec!(1.50))]
fn test_normalize_accepts_two_digit_amounts(#[case] input: Decimal, #[case] expected: Decimal) {
    let normalized = normalize_amount(input).unwrap();
    assert_eq!(normalized, expected);
    assert_eq!(normalized.scale(), AMOUNT_SCALE);
}

#[test]
fn test_normalize_rejects_third_digit() {
    assert_eq!(
        normalize_amount(dec!(1.005)),
        Err(AmountError::TooPrecise(dec!(1.005)))
    );
}

#[test]
fn test_normalize_rejects_oversized_amount() {
    let too_big = dec!(10000000000000.00);
    assert_eq!(normalize_amount(too_big), Err(AmountError::TooLarge(too_big)));

    let largest = dec!(9999999999999.99);
    assert_eq!(normalize_amount(largest).unwrap(), largest);
}

#[test]
fn test_round_amount_uses_bankers_rounding() {
    assert_eq!(round_amount(dec!(2.345)), dec!(2.34));
    assert_eq!(round_amount(dec!(2.355)), dec!(2.36));
    assert_eq!(round_amount(dec!(1800)).scale(), AMOUNT_SCALE);
}

#[test]
fn test_currency_display() {
    assert_eq!(CurrencyType::Som.to_string(), "som");
    assert_eq!(CurrencyType::Dollar.to_string(), "dollar");
    assert_eq!(CurrencyType::Won.to_string(), "won");
}

#[test]
fn test_currency_from_str() {
    assert_eq!(CurrencyType::from_str("EURO").unwrap(), CurrencyType::Euro);
    assert_eq!(CurrencyType::from_str(" tenge ").unwrap(), CurrencyType::Tenge);
    assert!(CurrencyType::from_str("peso").is_err());
}

#[test]
fn test_currency_default_is_som() {
    assert_eq!(CurrencyType::default(), CurrencyType::Som);
}
