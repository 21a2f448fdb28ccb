/// Email actions exposed as tools. There is no delivery backend: implementations
/// acknowledge the request and report what would have happened.
pub trait Mailbox: Send + Sync {
    fn send(&self, email: &OutgoingEmail<'_>) -> String;
    fn reply(&self, message_id: &str, body: &str) -> String;
    fn label(&self, message_id: &str, label_name: &str) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct OutgoingEmail<'a> {
    pub to: &'a str,
    pub subject: Option<&'a str>,
    pub body: Option<&'a str>,
}

/// Acknowledgment-only mailbox.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcknowledgingMailbox;

impl Mailbox for AcknowledgingMailbox {
    fn send(&self, email: &OutgoingEmail<'_>) -> String {
        tracing::info!(
            to = email.to,
            has_subject = email.subject.is_some(),
            body_len = email.body.map(str::len).unwrap_or(0),
            "sendEmail acknowledged without delivery"
        );
        match email.subject {
            Some(subject) => format!("Email sent to {} with subject \"{subject}\"", email.to),
            None => format!("Email sent to {} (no subject)", email.to),
        }
    }

    fn reply(&self, message_id: &str, body: &str) -> String {
        tracing::info!(
            message_id,
            body_len = body.len(),
            "replyToEmail acknowledged without delivery"
        );
        format!("Reply sent to message {message_id}")
    }

    fn label(&self, message_id: &str, label_name: &str) -> String {
        tracing::info!(message_id, label_name, "labelEmail acknowledged");
        format!("Label \"{label_name}\" applied to message {message_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_acknowledgment_names_recipient_and_subject() {
        let ack = AcknowledgingMailbox.send(&OutgoingEmail {
            to: "x@y.com",
            subject: Some("Quarterly numbers"),
            body: Some("See attached."),
        });
        assert_eq!(ack, "Email sent to x@y.com with subject \"Quarterly numbers\"");
    }

    #[test]
    fn send_without_subject_still_names_recipient() {
        let ack = AcknowledgingMailbox.send(&OutgoingEmail {
            to: "x@y.com",
            subject: None,
            body: None,
        });
        assert!(ack.contains("x@y.com"));
    }

    #[test]
    fn reply_and_label_reference_message() {
        assert_eq!(
            AcknowledgingMailbox.reply("msg-42", "Thanks!"),
            "Reply sent to message msg-42"
        );
        assert_eq!(
            AcknowledgingMailbox.label("msg-42", "Finance"),
            "Label \"Finance\" applied to message msg-42"
        );
    }
}
