//! Phone number hashing
//!
//! Teacher phone numbers never leave the device in clear text. They are
//! salted and hashed with SHA-256 before being attached to a query.

use sha2::{Digest, Sha256};

/// Salt used when none is configured
pub const DEFAULT_DEMO_SALT: &str = "edupulse-demo-salt-2026";

/// Placeholder sent instead of a phone number for demo submissions
pub const DEMO_PHONE: &str = "demo-000";

/// SHA-256 of `raw` followed by `salt`, as 64 lowercase hex characters
pub fn hash_phone_number(raw: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hashes phone numbers with a fixed salt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneHasher {
    salt: String,
}

impl Default for PhoneHasher {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_SALT)
    }
}

impl PhoneHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn hash(&self, phone: &str) -> String {
        hash_phone_number(phone, &self.salt)
    }

    /// The phone value to send with a query
    ///
    /// Demo submissions send [`DEMO_PHONE`]; a non-blank phone is trimmed
    /// and hashed; anything else sends nothing.
    pub fn phone_to_send(&self, phone: Option<&str>, is_demo: bool) -> Option<String> {
        if is_demo {
            return Some(DEMO_PHONE.to_string());
        }

        phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| self.hash(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let first = hash_phone_number("+919876543210", DEFAULT_DEMO_SALT);
        let second = hash_phone_number("+919876543210", DEFAULT_DEMO_SALT);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_salt_changes_hash() {
        assert_ne!(
            hash_phone_number("+919876543210", "salt-a"),
            hash_phone_number("+919876543210", "salt-b")
        );
    }

    #[test]
    fn test_hash_of_concatenation() {
        // sha256("abc")
        assert_eq!(
            hash_phone_number("ab", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_phone_to_send() {
        let hasher = PhoneHasher::default();

        assert_eq!(hasher.phone_to_send(Some("+91 98765"), true).as_deref(), Some(DEMO_PHONE));
        assert_eq!(
            hasher.phone_to_send(Some("  +919876543210 "), false),
            Some(hasher.hash("+919876543210"))
        );
        assert_eq!(hasher.phone_to_send(Some("   "), false), None);
        assert_eq!(hasher.phone_to_send(None, false), None);
    }
}
