use crate::message::{EmailMessage, EmailTemplate};

struct Copy {
    heading: &'static str,
    body: &'static str,
    button: &'static str,
    footnote: &'static str,
}

fn copy(template: EmailTemplate) -> Copy {
    match template {
        EmailTemplate::ConfirmSignup => Copy {
            heading: "Confirm your account",
            body: "Thanks for signing up. Confirm your email address to activate your account.",
            button: "Confirm account",
            footnote: "If you didn't create an account, you can ignore this email.",
        },
        EmailTemplate::ConfirmEmailChange => Copy {
            heading: "Confirm your new email address",
            body: "Confirm this address to finish changing the email on your account.",
            button: "Confirm email",
            footnote: "If you didn't request this change, you can ignore this email.",
        },
        EmailTemplate::CancelEmailChange => Copy {
            heading: "Email change requested",
            body: "Someone asked to move your account to a different email address.",
            button: "Cancel change",
            footnote: "If this was you, no action is needed.",
        },
        EmailTemplate::ConfirmUsernameChange => Copy {
            heading: "Confirm your username change",
            body: "Confirm to finish changing the username on your account.",
            button: "Confirm username",
            footnote: "If you didn't request this change, you can ignore this email.",
        },
        EmailTemplate::ConfirmPasswordChange => Copy {
            heading: "Confirm your password change",
            body: "Confirm to finish changing your password. You will be signed out everywhere.",
            button: "Confirm password",
            footnote: "If you didn't request this change, contact support immediately.",
        },
        EmailTemplate::ConfirmAccountDeletion => Copy {
            heading: "Confirm account deletion",
            body: "Confirm to permanently delete your account. This cannot be undone.",
            button: "Delete account",
            footnote: "If you didn't request this, use the cancel link we sent separately.",
        },
        EmailTemplate::CancelAccountDeletion => Copy {
            heading: "Account deletion requested",
            body: "Your account is scheduled for deletion once the request is confirmed.",
            button: "Cancel deletion",
            footnote: "If this was you, no action is needed.",
        },
        EmailTemplate::ChangeApplied => Copy {
            heading: "Your account was updated",
            body: "A requested change to your account has been applied and all sessions were signed out.",
            button: "",
            footnote: "If you didn't make this change, contact support immediately.",
        },
        EmailTemplate::NewLogin => Copy {
            heading: "New login to your account",
            body: "Your account was just signed in to from a device we haven't seen before.",
            button: "",
            footnote: "If this wasn't you, change your password now.",
        },
    }
}

pub(crate) fn render_text(message: &EmailMessage, brand: &str) -> String {
    let copy = copy(message.template);
    let link = message
        .link
        .as_deref()
        .map(|link| format!("{}:\n{}\n\n", copy.button, link))
        .unwrap_or_default();

    format!(
        "Hi {},\n\n{}\n\n{}{}\n\nBest regards,\n{} Team",
        message.to_name, copy.body, link, copy.footnote, brand
    )
}

pub(crate) fn render_html(message: &EmailMessage, brand: &str) -> String {
    let copy = copy(message.template);
    let action = match message.link.as_deref() {
        Some(link) => format!(
            r#"<table width="100%" cellpadding="0" cellspacing="0" style="margin: 30px 0;">
                                <tr>
                                    <td align="center">
                                        <a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: #4F46E5; color: #ffffff; text-decoration: none; border-radius: 6px; font-size: 16px; font-weight: bold;">{button}</a>
                                    </td>
                                </tr>
                            </table>
                            <p style="margin: 0 0 20px 0; color: #4F46E5; font-size: 14px; word-break: break-all;">{link}</p>"#,
            link = link,
            button = copy.button,
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{heading}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px;">
                    <tr>
                        <td style="background-color: #4F46E5; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">{brand}</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 24px;">{heading}</h2>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">Hi <strong>{name}</strong>,</p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">{body}</p>
                            {action}
                            <p style="margin: 0; color: #666666; font-size: 14px;">{footnote}</p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        heading = copy.heading,
        brand = brand,
        name = message.to_name,
        body = copy.body,
        action = action,
        footnote = copy.footnote,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_models::VerificationKind;

    #[test]
    fn test_link_appears_in_both_bodies() {
        let msg = EmailMessage::new("a@x.com", "alice", EmailTemplate::ConfirmSignup).with_link(
            VerificationKind::Signup,
            "https://app/verify?token=abc",
            "abc",
        );
        assert!(render_text(&msg, "Warden").contains("https://app/verify?token=abc"));
        assert!(render_html(&msg, "Warden").contains(r#"href="https://app/verify?token=abc""#));
    }

    #[test]
    fn test_informational_email_has_no_button() {
        let msg = EmailMessage::new("a@x.com", "alice", EmailTemplate::NewLogin);
        assert!(!render_html(&msg, "Warden").contains("<a href"));
        assert!(render_text(&msg, "Warden").starts_with("Hi alice,"));
    }
}
