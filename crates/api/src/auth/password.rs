//! bcrypt password hashing and verification.
//!
//! Hashes use [`bcrypt::DEFAULT_COST`]; the cost and salt are embedded in the
//! stored string, so verification needs nothing but the hash.

/// Hash a plaintext password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// Returns `false` on mismatch and also when the stored hash is malformed.
pub fn check_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");

        assert!(hash.starts_with("$2"), "expected a bcrypt hash prefix");
        assert_ne!(hash, password);
        assert!(check_password(password, &hash), "correct password should verify");
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("real-password").expect("hashing should succeed");
        assert!(!check_password("wrong-password", &hash));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        assert!(!check_password("anything", "not-a-bcrypt-hash"));
        assert!(!check_password("anything", ""));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b, "each hash must use a fresh salt");
    }
}
