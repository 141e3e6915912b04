use wireframe_core::bcrypt::{compare, gen_salt, get_rounds, hash, hash_with_salt, BcryptError, Version};

const COST: u32 = 4;

#[test]
fn hash_then_compare_holds_across_both_versions_and_a_cost_range() {
    for version in [Version::V2a, Version::V2b] {
        for cost in [4, 6, 10] {
            let hashed = hash("hunter2", cost, version).unwrap();
            assert_eq!(compare("hunter2", &hashed), Ok(true), "version={version:?} cost={cost}");
            assert_eq!(get_rounds(&hashed), Ok(cost));
        }
    }
}

#[test]
fn compare_rejects_a_different_password() {
    let hashed = hash("correct horse battery staple", COST, Version::V2b).unwrap();
    assert_eq!(compare("incorrect horse", &hashed), Ok(false));
}

/// A fixed, externally known bcrypt test vector.
#[test]
fn known_test_vector_matches() {
    let hash = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";
    assert_eq!(compare("password", hash), Ok(true));
    assert_eq!(compare("password123", hash), Ok(false));
}

#[test]
fn hash_with_salt_is_deterministic_given_the_same_salt() {
    let salt = gen_salt(COST, Version::V2a).unwrap();
    let a = hash_with_salt("same password", &salt).unwrap();
    let b = hash_with_salt("same password", &salt).unwrap();
    assert_eq!(a, b);
}

#[test]
fn two_salts_for_the_same_password_differ() {
    let a = hash("same password", COST, Version::V2b).unwrap();
    let b = hash("same password", COST, Version::V2b).unwrap();
    assert_ne!(a, b);
    assert_eq!(compare("same password", &a), Ok(true));
    assert_eq!(compare("same password", &b), Ok(true));
}

#[test]
fn cost_outside_valid_range_is_rejected() {
    assert_eq!(hash("pw", 3, Version::V2b), Err(BcryptError::InvalidCost(3)));
    assert_eq!(hash("pw", 32, Version::V2b), Err(BcryptError::InvalidCost(32)));
}

#[test]
fn malformed_hash_is_rejected_rather_than_panicking() {
    assert!(matches!(compare("pw", "not a bcrypt hash"), Err(BcryptError::InvalidHash(_))));
    assert!(matches!(compare("pw", "$2b$10$tooshort"), Err(BcryptError::InvalidHash(_))));
}

#[test]
fn password_longer_than_72_bytes_truncates_consistently() {
    let long_a = "x".repeat(100);
    let mut long_b_bytes = vec![b'x'; 72];
    long_b_bytes.extend_from_slice(b"DIFFERENT-TAIL-BEYOND-72-BYTES");
    let long_b = String::from_utf8(long_b_bytes).unwrap();

    let salt = gen_salt(COST, Version::V2b).unwrap();
    let hash_a = hash_with_salt(&long_a, &salt).unwrap();
    let hash_b = hash_with_salt(&long_b, &salt).unwrap();
    assert_eq!(hash_a, hash_b);
}
