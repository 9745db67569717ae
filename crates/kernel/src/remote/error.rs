//! Per-source remote error types.
//!
//! Every error names the remote it came from so a failure can be recorded
//! against that source and logged without further context.

use thiserror::Error;

/// Errors from loading or activating one remote source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The navigation document could not be retrieved.
    #[error("remote '{remote}': unavailable: {details}")]
    RemoteUnavailable { remote: String, details: String },

    /// The navigation document was retrieved but is not a valid manifest.
    #[error("remote '{remote}': malformed navigation manifest: {details}")]
    RemoteMalformed { remote: String, details: String },

    /// The localization unit could not be retrieved or decoded.
    #[error("remote '{remote}': localization unavailable: {details}")]
    LocalizationUnavailable { remote: String, details: String },

    /// The localization unit was retrieved but could not be installed.
    #[error("remote '{remote}': localization activation failed: {details}")]
    LocalizationActivationFailed { remote: String, details: String },
}

impl RemoteError {
    pub fn unavailable(remote: impl Into<String>, details: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            remote: remote.into(),
            details: details.into(),
        }
    }

    pub fn malformed(remote: impl Into<String>, details: impl Into<String>) -> Self {
        Self::RemoteMalformed {
            remote: remote.into(),
            details: details.into(),
        }
    }

    pub fn localization_unavailable(
        remote: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::LocalizationUnavailable {
            remote: remote.into(),
            details: details.into(),
        }
    }

    pub fn activation_failed(remote: impl Into<String>, details: impl Into<String>) -> Self {
        Self::LocalizationActivationFailed {
            remote: remote.into(),
            details: details.into(),
        }
    }

    /// The remote source this error belongs to.
    pub fn remote(&self) -> &str {
        match self {
            Self::RemoteUnavailable { remote, .. }
            | Self::RemoteMalformed { remote, .. }
            | Self::LocalizationUnavailable { remote, .. }
            | Self::LocalizationActivationFailed { remote, .. } => remote,
        }
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RemoteUnavailable { .. } => "unavailable",
            Self::RemoteMalformed { .. } => "malformed",
            Self::LocalizationUnavailable { .. } => "localization_unavailable",
            Self::LocalizationActivationFailed { .. } => "activation_failed",
        }
    }

    /// Whether the error concerns the localization track rather than
    /// navigation entries.
    pub fn is_localization(&self) -> bool {
        matches!(
            self,
            Self::LocalizationUnavailable { .. } | Self::LocalizationActivationFailed { .. }
        )
    }
}
