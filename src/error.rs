pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Item is not ranked.")]
    NotFound,
    #[error("Item is already ranked in tier {tier}, bucket {bucket}.")]
    AlreadyRanked { tier: usize, bucket: usize },
    #[error("Tier {tier} is out of range for {tiers} tiers.")]
    TierOutOfRange { tier: usize, tiers: usize },
    #[error("Position {position} is out of range for {len} items.")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("Bucket {bucket} of size {size} cannot be split at offset {offset}.")]
    InvalidSplit {
        bucket: usize,
        offset: usize,
        size: usize,
    },
    #[error("Bucket {bucket} is empty.")]
    EmptyBucket { bucket: usize },
    #[error("Comparison against bucket {bucket} could not be decided.")]
    Undecidable { bucket: usize },
    #[error("Ranking invariant violated: {0}")]
    InvariantViolation(String),
    #[error("{message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Builds an [`Error::InvariantViolation`] and reports it loudly.
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(%message, "Ranking invariant violated.");
        Self::InvariantViolation(message)
    }
}
