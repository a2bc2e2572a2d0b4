//! Property tests for document normalization.

use proptest::prelude::*;

use super::*;

proptest! {
    #[test]
    fn prop_cnpj_normalization_is_idempotent(digits in "[0-9]{14}") {
        let once = normalize_cnpj(&digits).unwrap();
        let twice = normalize_cnpj(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), 18);
    }

    #[test]
    fn prop_cnpj_keeps_digits_in_order(digits in "[0-9]{14}") {
        let masked = normalize_cnpj(&digits).unwrap();
        let back: String = masked.chars().filter(char::is_ascii_digit).collect();
        prop_assert_eq!(back, digits);
    }

    #[test]
    fn prop_cpf_normalization_is_idempotent(digits in "[0-9]{11}") {
        let once = normalize_cpf(&digits).unwrap();
        prop_assert_eq!(normalize_cpf(&once).unwrap(), once);
    }

    #[test]
    fn prop_wrong_length_always_rejected(digits in "[0-9]{1,30}") {
        prop_assume!(digits.len() != 14);
        prop_assert!(normalize_cnpj(&digits).is_err());
    }

    #[test]
    fn prop_punctuation_is_ignored(digits in "[0-9]{11}", noise in "[ ./-]{0,5}") {
        let noisy = format!("{noise}{digits}{noise}");
        prop_assert_eq!(normalize_cpf(&noisy).unwrap(), normalize_cpf(&digits).unwrap());
    }
}
