//! Enrollment policy configuration.

/// How direct enrollment treats a user without an email address.
///
/// The lottery is never filtered by this policy; a winner without an address
/// simply gets no invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingContactPolicy {
    /// Refuse the enrollment outright.
    #[default]
    Reject,
    /// Admit the user and record the notification as skipped.
    SkipNotification,
}

/// Enrollment policy configuration.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentConfig {
    /// Policy for users without a contact address.
    pub missing_contact: MissingContactPolicy,
}
