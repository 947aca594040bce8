use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::info;

/// Out-of-band delivery of password reset links.
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_link(
        &self,
        email: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()>;
}

/// Writes the reset link to the log instead of sending mail.
#[derive(Clone)]
pub struct LogNotifier {
    base_url: String,
}

impl LogNotifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/user/reset-password?token={}", self.base_url, token)
    }
}

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset_link(
        &self,
        email: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        info!(%email, %expires_at, link = %self.reset_link(token), "password reset link");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_link_points_at_reset_route() {
        let n = LogNotifier::new("http://localhost:8080");
        assert_eq!(
            n.reset_link("abc"),
            "http://localhost:8080/user/reset-password?token=abc"
        );
    }
}
