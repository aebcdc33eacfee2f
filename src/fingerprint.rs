//! Manifest content fingerprint
//!
//! SHA-256 over the exact bytes of the manifest text, lowercase hex.
//! Only used to detect changes, never as a content identifier.

use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a previously stored digest
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn fingerprint(text: &str) -> Fingerprint {
    let digest = Sha256::digest(text.as_bytes());
    Fingerprint(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // sha256("") is a fixed, well-known value
        assert_eq!(
            fingerprint("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_identical_text_identical_fingerprint() {
        let body = r#"[{"title":"A","file":"a.mp4"}]"#;
        assert_eq!(fingerprint(body), fingerprint(&body.to_string()));
    }

    #[test]
    fn test_one_byte_difference_changes_fingerprint() {
        let a = fingerprint(r#"[{"title":"A","file":"a.mp4"}]"#);
        let b = fingerprint(r#"[{"title":"B","file":"a.mp4"}]"#);
        // Whitespace is significant, the hash is over raw bytes
        let c = fingerprint(r#"[{"title":"A","file":"a.mp4"}] "#);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_lowercase_hex_fixed_length() {
        let fp = fingerprint("anything");
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(fp.short().len(), 12);
    }
}
