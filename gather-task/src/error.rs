/// Failure of a single processor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The processor body returned an error.
    #[error(transparent)]
    Failed(anyhow::Error),

    /// The processor suspended on something
    /// other than its input relay, which the
    /// driver has no way to resume.
    #[error("processor suspended outside of an input request")]
    ForeignSuspension,

    /// The processor was still suspended after
    /// the end of input had been delivered.
    #[error("processor did not terminate after the end of input")]
    Unterminated,
}
