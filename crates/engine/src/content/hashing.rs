use sha2::{Digest, Sha256};

const LAYOUT_FINGERPRINT_DOMAIN: &[u8] = b"dungeon-layout-v1";

/// SHA-256 of a layout document, lower-case hex. Saves carry it to detect layout drift.
pub fn fingerprint_layout(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(LAYOUT_FINGERPRINT_DOMAIN);
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    to_hex_lower(&hasher.finalize())
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_lowercase_hex() {
        let first = fingerprint_layout("<Dungeon/>");
        let second = fingerprint_layout("<Dungeon/>");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch)));
    }

    #[test]
    fn fingerprint_changes_with_layout_edit() {
        let a = fingerprint_layout("<Dungeon start=\"1\"/>");
        let b = fingerprint_layout("<Dungeon start=\"2\"/>");
        assert_ne!(a, b);
    }

    #[test]
    fn hex_encoding_pads_bytes() {
        assert_eq!(to_hex_lower(&[0x00, 0x0f, 0xab]), "000fab");
    }
}
