pub type PlumeResult<T> = Result<T, PlumeError>;

#[derive(thiserror::Error, Debug)]
pub enum PlumeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("text error: {0}")]
    Text(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlumeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn text(msg: impl Into<String>) -> Self {
        Self::Text(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PlumeError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(PlumeError::text("x").to_string().contains("text error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PlumeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
