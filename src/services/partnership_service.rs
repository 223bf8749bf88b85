use crate::config::NotificationConfig;
use crate::error::{AppError, AppResult};
use crate::models::{PartnershipInquiry, PartnershipReceipt};
use crate::utils::Validate;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub from: Option<String>,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

/// 邮件发送出口
pub trait Notifier: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> AppResult<()>;
}

/// 只写日志，不实际投递
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, email: &OutboundEmail) -> AppResult<()> {
        log::info!(
            "Email to {} (reply-to {}): {} [{} bytes]",
            email.to,
            email.reply_to,
            email.subject,
            email.body.len()
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct PartnershipService {
    config: NotificationConfig,
    notifier: Arc<dyn Notifier>,
}

impl PartnershipService {
    pub fn new(config: NotificationConfig) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(config: NotificationConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    /// 提交合作咨询：校验表单后转发给配置的收件人
    pub fn submit(&self, inquiry: PartnershipInquiry) -> AppResult<PartnershipReceipt> {
        inquiry.validate()?;
        let recipient = self
            .config
            .partnership_recipient
            .clone()
            .ok_or_else(|| {
                AppError::ConfigError("Partnership recipient address is not configured".to_string())
            })?;

        let reference = Uuid::new_v4();
        let subject = format!(
            "Partnership inquiry from {} [{}]",
            inquiry.organization.trim(),
            reference
        );
        let body = format!(
            "Organization: {}\nContact: {}\nEmail: {}\nPhone: {}\nType: {}\n\n{}",
            inquiry.organization.trim(),
            inquiry.contact_name.trim(),
            inquiry.email.trim(),
            inquiry.phone.as_deref().unwrap_or("-"),
            inquiry.partnership_type.as_deref().unwrap_or("-"),
            inquiry.message.trim(),
        );
        self.notifier.send(&OutboundEmail {
            to: recipient,
            from: self.config.sender.clone(),
            reply_to: inquiry.email.trim().to_string(),
            subject,
            body,
        })?;

        log::info!("Partnership inquiry {reference} received");
        Ok(PartnershipReceipt {
            reference,
            received_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<OutboundEmail>>);

    impl Notifier for Outbox {
        fn send(&self, email: &OutboundEmail) -> AppResult<()> {
            self.0.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn inquiry() -> PartnershipInquiry {
        PartnershipInquiry {
            organization: "Acme Foundation".into(),
            contact_name: "Road Runner".into(),
            email: "rr@acme.org".into(),
            message: "We would like to match employee donations.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_recipient_is_config_error() {
        let service = PartnershipService::new(NotificationConfig::default());
        assert!(matches!(service.submit(inquiry()), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_inquiry_is_forwarded() {
        let outbox = Arc::new(Outbox::default());
        let config = NotificationConfig {
            partnership_recipient: Some("partners@charity.org".into()),
            sender: None,
        };
        let service = PartnershipService::with_notifier(config, outbox.clone());
        let receipt = service.submit(inquiry()).unwrap();

        let sent = outbox.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "partners@charity.org");
        assert_eq!(sent[0].reply_to, "rr@acme.org");
        assert!(sent[0].subject.contains(&receipt.reference.to_string()));
    }
}
