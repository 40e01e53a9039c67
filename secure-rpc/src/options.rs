use std::time::Duration;

/// Per-call settings.
///
/// Nothing is configured by default: a call waits for as long as the transport lets it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Stop waiting after this long and fail with `RpcError::Timeout`.
    pub deadline: Option<Duration>,
}

impl CallOptions {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Fills unset fields from `defaults`; values set on `self` win.
    pub fn or(self, defaults: CallOptions) -> Self {
        Self {
            deadline: self.deadline.or(defaults.deadline),
        }
    }
}
