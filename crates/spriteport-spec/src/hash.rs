//! BLAKE3 helpers for artifact identity and content hashing.

/// Length of a derived sprite id in hex characters.
pub const SPRITE_ID_LEN: usize = 32;

/// Computes a BLAKE3 hash of raw bytes as lowercase hex.
pub fn blake3_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Derives a stable id for a sprite that has no existing identity.
///
/// The id depends only on the sheet name and the sprite name, so a first
/// import of the same file always produces the same ids.
pub fn derive_sprite_id(sheet: &str, sprite_name: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"spriteport.sprite\0");
    hasher.update(sheet.as_bytes());
    hasher.update(b"\0");
    hasher.update(sprite_name.as_bytes());
    let hex = hasher.finalize().to_hex();
    hex[..SPRITE_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_id_is_stable_and_distinct() {
        let a = derive_sprite_id("hero", "hero_walk_0");
        assert_eq!(a, derive_sprite_id("hero", "hero_walk_0"));
        assert_eq!(a.len(), SPRITE_ID_LEN);
        assert_ne!(a, derive_sprite_id("hero", "hero_walk_1"));
        // separator keeps ("ab", "c") and ("a", "bc") apart
        assert_ne!(derive_sprite_id("ab", "c"), derive_sprite_id("a", "bc"));
    }

    #[test]
    fn test_blake3_hash_hex() {
        let h = blake3_hash(b"sheet");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
