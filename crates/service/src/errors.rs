use thiserror::Error;

/// Errors surfaced by catalog operations.
///
/// Each failure is scoped to the call that produced it; none leaves the caches
/// partially written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Creature with id {0} not found")]
    NotFound(i64),
    #[error("Creature with name {0} already exists")]
    DuplicateName(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ServiceError {
    pub fn upstream(reason: impl std::fmt::Display) -> Self {
        Self::Upstream(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_value() {
        assert_eq!(ServiceError::NotFound(-1).to_string(), "Creature with id -1 not found");
        assert_eq!(
            ServiceError::DuplicateName("Bulbasaur".into()).to_string(),
            "Creature with name Bulbasaur already exists"
        );
        assert_eq!(ServiceError::upstream("timed out").to_string(), "upstream error: timed out");
    }
}
