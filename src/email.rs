use async_trait::async_trait;
use tracing::info;

/// Outbound email capability. The handlers only know how to hand a message
/// over; delivery (SMTP, API, dev logging) lives behind this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// Development sender: logs the message and reports success.
#[derive(Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        info!(to = %to, subject = %subject, bytes = html.len(), "email send stub");
        Ok(())
    }
}

pub fn verification_email(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; padding: 20px;">
      <h2 style="background-color: #4caf50; color: white; padding: 10px; text-align: center;">Email Verification</h2>
      <p>Hello,</p>
      <p>Thank you for signing up! Please use the following code to verify your email address:</p>
      <div style="font-size: 24px; font-weight: bold; letter-spacing: 4px;">{code}</div>
      <p>This code is valid for the next 10 minutes.</p>
      <p style="font-size: 12px; color: #888;">If you did not request this email, please ignore it.</p>
    </div>
  </body>
</html>"#
    )
}

pub fn password_reset_email(link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; padding: 20px;">
      <h2 style="background-color: #4caf50; color: white; padding: 10px; text-align: center;">Password Reset</h2>
      <p>Hello,</p>
      <p>You requested to reset your password. Click the button below to proceed:</p>
      <a href="{link}" style="display: inline-block; padding: 10px 20px; color: #ffffff; background-color: #4caf50; text-decoration: none;">Reset Password</a>
      <p style="font-size: 12px; color: #999;">If you didn't request this, please ignore this email.</p>
    </div>
  </body>
</html>"#
    )
}

pub fn username_recovery_email(username: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; padding: 20px;">
      <h2 style="background-color: #4caf50; color: white; padding: 10px; text-align: center;">Username Recovery</h2>
      <p>Hello,</p>
      <p>It looks like you've requested to recover your username.</p>
      <p>Your username is:</p>
      <p style="font-size: 18px; font-weight: bold;">{username}</p>
      <p style="font-size: 12px; color: #999;">If you didn't request this, please ignore this email.</p>
    </div>
  </body>
</html>"#
    )
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every message instead of sending it.
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), html.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_template_embeds_the_code() {
        let html = verification_email("042137");
        assert!(html.contains("042137"));
        assert!(html.contains("Email Verification"));
    }

    #[test]
    fn reset_template_embeds_the_link() {
        let html = password_reset_email("https://habster.app/reset/deadbeef");
        assert!(html.contains(r#"href="https://habster.app/reset/deadbeef""#));
    }

    #[test]
    fn username_template_embeds_the_username() {
        let html = username_recovery_email("alice");
        assert!(html.contains("alice"));
        assert!(html.contains("Username Recovery"));
    }

    #[tokio::test]
    async fn log_mailer_reports_success() {
        assert!(LogMailer.send("a@x.com", "s", "<p>hi</p>").await.is_ok());
    }
}
