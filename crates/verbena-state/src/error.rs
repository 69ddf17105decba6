use crate::validate::ValidationError;

/// Boxed error from a collaborator (saver, remote validator).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from an editor's save flow.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
  /// A save is already in flight.
  #[error("a save is already in progress")]
  Busy,

  /// Local validation failed; nothing was sent.
  #[error("configuration is invalid: {}", join(.0))]
  Invalid(Vec<ValidationError>),

  /// The saver rejected the configuration. All edits are kept.
  #[error("save rejected: {source}")]
  Rejected {
    #[source]
    source: BoxError,
  },

  /// A save was finished with a ticket that does not belong to the pending save.
  #[error("no matching save in progress")]
  NotSaving,
}

/// Errors from an on-demand validation check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
  /// The remote validator could not be reached or answered with an error.
  #[error("remote validation failed: {source}")]
  Remote {
    #[source]
    source: BoxError,
  },
}

fn join(errors: &[ValidationError]) -> String {
  errors
    .iter()
    .map(|e| e.message.as_str())
    .collect::<Vec<_>>()
    .join("; ")
}
