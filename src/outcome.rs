//! Runtime outcome codes.
//!
//! `no_std` kernel crates in this lineage do not carry `thiserror`/`anyhow`;
//! the outcome enum plays their role. Every blocking operation returns one
//! of these four values — there is no broader error type to convert into.

/// The result of a blocking (or fast-path) kernel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The operation completed normally.
    Success,
    /// The object was reset while the caller was waiting.
    Stopped,
    /// The object was destroyed while the caller was waiting.
    Deleted,
    /// The fast path found nothing available, or a timed wait's deadline
    /// expired before the operation could complete.
    Timeout,
}

impl Outcome {
    /// Returns whether this outcome indicates the operation's normal effect
    /// took place (as opposed to being interrupted or timing out).
    pub const fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_success() {
        assert!(Outcome::Success.is_success());
        assert!(!Outcome::Stopped.is_success());
        assert!(!Outcome::Deleted.is_success());
        assert!(!Outcome::Timeout.is_success());
    }
}
