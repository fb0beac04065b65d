use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '\\\\'")]
    Backslash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Decor sprite keys are lowercase relative paths such as `decor/barrel`.
pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    let allowed =
        |ch: &char| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-');
    if let Some(character) = key.chars().find(|ch| !allowed(ch)) {
        return Err(SpriteKeyError::InvalidCharacter { character });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_decor_keys() {
        for key in ["barrel", "decor/torch_2", "props/crate-large"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_keys_that_escape_or_mix_case() {
        assert_eq!(validate_sprite_key(""), Err(SpriteKeyError::Empty));
        assert_eq!(validate_sprite_key("/decor"), Err(SpriteKeyError::LeadingSlash));
        assert_eq!(validate_sprite_key("decor/../x"), Err(SpriteKeyError::ParentTraversal));
        assert_eq!(validate_sprite_key(r"decor\x"), Err(SpriteKeyError::Backslash));
        assert_eq!(
            validate_sprite_key("Barrel"),
            Err(SpriteKeyError::InvalidCharacter { character: 'B' })
        );
    }
}
