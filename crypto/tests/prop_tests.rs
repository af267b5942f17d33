use proptest::prelude::*;

use vulcan_crypto::{new_code, owner_from_email, validate_address, CODE_SIZE};

proptest! {
    /// Owner derivation is stable across calls.
    #[test]
    fn owner_is_stable(email in "[a-z0-9.]{1,20}@[a-z]{1,10}\\.[a-z]{2,4}") {
        prop_assert_eq!(owner_from_email(&email), owner_from_email(&email));
    }

    /// Distinct emails map to distinct owners.
    #[test]
    fn owners_differ(a in "[a-z]{1,16}@x\\.com", b in "[a-z]{1,16}@x\\.com") {
        prop_assume!(a != b);
        prop_assert_ne!(owner_from_email(&a), owner_from_email(&b));
    }

    /// Owners are always 32 lowercase hex characters.
    #[test]
    fn owner_shape(email in ".{0,64}") {
        let owner = owner_from_email(&email);
        prop_assert_eq!(owner.as_str().len(), 32);
        prop_assert!(owner.as_str().bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    /// Arbitrary strings never panic the address validator.
    #[test]
    fn validator_never_panics(s in ".{0,100}") {
        let _ = validate_address(&s, "decentr");
    }
}

#[test]
fn codes_have_declared_length_and_do_not_repeat() {
    let mut seen = std::collections::HashSet::new();
    for _ in 0..256 {
        let code = new_code().unwrap();
        assert_eq!(code.len(), CODE_SIZE * 2);
        assert!(seen.insert(code));
    }
}
