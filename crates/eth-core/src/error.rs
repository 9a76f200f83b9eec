use thiserror::Error;

/// Transaction engine errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("value too large: {0} bytes does not fit a 32-byte word")]
    ValueTooLarge(usize),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_key() {
        let err = EthError::InvalidKey("odd hex length".into());
        assert_eq!(err.to_string(), "invalid private key: odd hex length");
    }

    #[test]
    fn display_invalid_recipient() {
        let err = EthError::InvalidRecipient("missing 0x prefix".into());
        assert_eq!(
            err.to_string(),
            "invalid recipient address: missing 0x prefix"
        );
    }

    #[test]
    fn display_value_too_large() {
        let err = EthError::ValueTooLarge(33);
        assert_eq!(
            err.to_string(),
            "value too large: 33 bytes does not fit a 32-byte word"
        );
    }

    #[test]
    fn display_signing_failed() {
        let err = EthError::SigningFailed("bad scalar".into());
        assert_eq!(err.to_string(), "signing failed: bad scalar");
    }

    #[test]
    fn display_malformed_encoding() {
        let err = EthError::MalformedEncoding("trailing bytes".into());
        assert_eq!(err.to_string(), "malformed encoding: trailing bytes");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(EthError::SigningFailed("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
