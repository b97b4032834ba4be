use serde::Serialize;
use warden_models::VerificationKind;

/// Which email to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    ConfirmSignup,
    ConfirmEmailChange,
    /// Sent to the old address while an email change is pending.
    CancelEmailChange,
    ConfirmUsernameChange,
    ConfirmPasswordChange,
    ConfirmAccountDeletion,
    CancelAccountDeletion,
    /// Sent after a verified change has been applied.
    ChangeApplied,
    /// Login from a device other than the first one seen.
    NewLogin,
}

impl EmailTemplate {
    pub fn subject(&self) -> &'static str {
        match self {
            EmailTemplate::ConfirmSignup => "Confirm your account",
            EmailTemplate::ConfirmEmailChange => "Confirm your new email address",
            EmailTemplate::CancelEmailChange => "Your email address is being changed",
            EmailTemplate::ConfirmUsernameChange => "Confirm your username change",
            EmailTemplate::ConfirmPasswordChange => "Confirm your password change",
            EmailTemplate::ConfirmAccountDeletion => "Confirm account deletion",
            EmailTemplate::CancelAccountDeletion => "Your account is scheduled for deletion",
            EmailTemplate::ChangeApplied => "Your account was updated",
            EmailTemplate::NewLogin => "New login to your account",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to_address: String,
    pub to_name: String,
    /// Confirm or cancel link; absent for informational emails.
    pub link: Option<String>,
    pub token: Option<String>,
    pub kind: Option<VerificationKind>,
    pub template: EmailTemplate,
}

impl EmailMessage {
    pub fn new(
        to_address: impl Into<String>,
        to_name: impl Into<String>,
        template: EmailTemplate,
    ) -> Self {
        Self {
            to_address: to_address.into(),
            to_name: to_name.into(),
            link: None,
            token: None,
            kind: None,
            template,
        }
    }

    /// Attaches a verification link and the token it carries.
    pub fn with_link(
        mut self,
        kind: VerificationKind,
        link: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.kind = Some(kind);
        self.link = Some(link.into());
        self.token = Some(token.into());
        self
    }
}

/// Body POSTed to the configured webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookNotification {
    /// Username or email of the account the event concerns.
    pub identifier: String,
    pub message: String,
}

impl WebhookNotification {
    pub fn new(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            message: message.into(),
        }
    }
}
