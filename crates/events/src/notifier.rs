//! Notification emails for premium and moderation events.
//!
//! Every method renders one template, hands the result to the [`Mailer`] and
//! returns a [`CreateEmailNotification`] describing the attempt. Delivery
//! failures never surface as errors: the returned entry carries
//! `is_sent = false` and the error text, and [`Notifier::record`] persists it.

use std::sync::Arc;

use chrono::Utc;
use estate_core::premium::PlanType;
use estate_core::types::{DbId, Money, Timestamp};
use estate_db::models::notification::{CreateEmailNotification, EmailNotification};
use estate_db::models::premium::{PremiumListing, PremiumNoticeTarget};
use estate_db::repositories::EmailNotificationRepo;
use estate_db::DbPool;
use tera::Context;

use crate::delivery::email::{Mailer, OutgoingEmail};
use crate::templates::{EmailTemplates, NotificationKind};

const DATE_FORMAT: &str = "%B %d, %Y";

/// Who an email goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: Option<DbId>,
    /// Greeting name: full name when known, username otherwise.
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(user_id: DbId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<&PremiumNoticeTarget> for Recipient {
    fn from(target: &PremiumNoticeTarget) -> Self {
        Recipient::new(target.user_id, &target.username, &target.email)
    }
}

/// Property a premium notification is about.
#[derive(Debug, Clone, Copy)]
pub struct ListingSubject<'a> {
    pub property_id: DbId,
    pub property_title: &'a str,
}

pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    templates: EmailTemplates,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, templates: EmailTemplates) -> Self {
        Self { mailer, templates }
    }

    pub fn templates(&self) -> &EmailTemplates {
        &self.templates
    }

    pub async fn premium_activated(
        &self,
        to: &Recipient,
        property: ListingSubject<'_>,
        listing: &PremiumListing,
    ) -> CreateEmailNotification {
        let mut ctx = self.base_context(to, property);
        ctx.insert("plan_name", &plan_name(&listing.plan_type));
        ctx.insert("amount", &listing.amount_paid.round_dp(2).to_string());
        ctx.insert("payment_id", &listing.payment_id);
        ctx.insert("start_date", &listing.start_date.format(DATE_FORMAT).to_string());
        ctx.insert("end_date", &listing.end_date.format(DATE_FORMAT).to_string());
        self.deliver(NotificationKind::PremiumActivated, to, &ctx).await
    }

    pub async fn payment_failed(
        &self,
        to: &Recipient,
        property: ListingSubject<'_>,
        plan: PlanType,
        amount: Money,
        payment_id: &str,
        error: &str,
    ) -> CreateEmailNotification {
        let mut ctx = self.base_context(to, property);
        ctx.insert("plan_name", plan.display_name());
        ctx.insert("amount", &amount.round_dp(2).to_string());
        ctx.insert("payment_id", payment_id);
        ctx.insert("error", error);
        ctx.insert(
            "checkout_url",
            &self.templates.link(&format!(
                "/premium/plans?plan={}&property={}",
                plan.as_str(),
                property.property_id
            )),
        );
        self.deliver(NotificationKind::PaymentFailed, to, &ctx).await
    }

    pub async fn premium_expiring(
        &self,
        target: &PremiumNoticeTarget,
        now: Timestamp,
    ) -> CreateEmailNotification {
        let to = Recipient::from(target);
        let mut ctx = self.base_context(&to, notice_subject(target));
        ctx.insert("plan_name", &plan_name(&target.plan_type));
        ctx.insert("end_date", &target.end_date.format(DATE_FORMAT).to_string());
        ctx.insert(
            "days_remaining",
            &estate_core::premium::days_remaining(target.end_date, now),
        );
        ctx.insert(
            "renewal_url",
            &self.templates.link(&format!(
                "/premium/plans?plan={}&property={}",
                target.plan_type, target.property_id
            )),
        );
        self.deliver(NotificationKind::PremiumExpiring, &to, &ctx).await
    }

    pub async fn premium_expired(&self, target: &PremiumNoticeTarget) -> CreateEmailNotification {
        let to = Recipient::from(target);
        let mut ctx = self.base_context(&to, notice_subject(target));
        ctx.insert("plan_name", &plan_name(&target.plan_type));
        ctx.insert("end_date", &target.end_date.format(DATE_FORMAT).to_string());
        self.deliver(NotificationKind::PremiumExpired, &to, &ctx).await
    }

    /// `action` is the past-tense verb shown to the owner ("approved", ...).
    pub async fn image_moderated(
        &self,
        to: &Recipient,
        property: ListingSubject<'_>,
        image_id: DbId,
        action: &str,
        reason: Option<&str>,
    ) -> CreateEmailNotification {
        let mut ctx = self.base_context(to, property);
        ctx.insert("image_id", &image_id);
        ctx.insert("action", action);
        ctx.insert("reason", &reason.filter(|r| !r.trim().is_empty()));
        self.deliver(NotificationKind::ImageModerated, to, &ctx).await
    }

    /// Persist a delivery attempt. Storage errors are logged and swallowed.
    pub async fn record(
        pool: &DbPool,
        entry: &CreateEmailNotification,
    ) -> Option<EmailNotification> {
        match EmailNotificationRepo::create(pool, entry).await {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    notification_type = %entry.notification_type,
                    recipient = %entry.recipient,
                    "Failed to record email notification"
                );
                None
            }
        }
    }

    fn base_context(&self, to: &Recipient, property: ListingSubject<'_>) -> Context {
        let mut ctx = Context::new();
        ctx.insert("user_name", &to.name);
        ctx.insert("user_email", &to.email);
        ctx.insert("property_id", &property.property_id);
        ctx.insert("property_title", property.property_title);
        ctx.insert(
            "property_url",
            &self.templates.link(&format!("/properties/{}", property.property_id)),
        );
        ctx.insert("dashboard_url", &self.templates.link("/premium/dashboard"));
        ctx.insert("plans_url", &self.templates.link("/premium/plans"));
        ctx
    }

    async fn deliver(
        &self,
        kind: NotificationKind,
        to: &Recipient,
        ctx: &Context,
    ) -> CreateEmailNotification {
        let rendered = match self.templates.render(kind, ctx) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, notification_type = %kind, "Failed to render email");
                return failed_entry(kind, to, "Email Send Failed".into(), String::new(), e.to_string());
            }
        };

        let email = OutgoingEmail {
            to: to.email.clone(),
            subject: rendered.subject,
            body: rendered.body,
        };

        match self.mailer.send(&email).await {
            Ok(()) => {
                tracing::info!(notification_type = %kind, to = %to.email, "Notification sent");
                CreateEmailNotification {
                    user_id: to.user_id,
                    notification_type: kind.as_str().to_string(),
                    subject: email.subject,
                    message: email.body,
                    recipient: email.to,
                    is_sent: true,
                    sent_at: Some(Utc::now()),
                    error_message: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    notification_type = %kind,
                    to = %to.email,
                    "Failed to send notification"
                );
                failed_entry(kind, to, email.subject, email.body, e.to_string())
            }
        }
    }
}

fn failed_entry(
    kind: NotificationKind,
    to: &Recipient,
    subject: String,
    message: String,
    error: String,
) -> CreateEmailNotification {
    CreateEmailNotification {
        user_id: to.user_id,
        notification_type: kind.as_str().to_string(),
        subject,
        message,
        recipient: to.email.clone(),
        is_sent: false,
        sent_at: None,
        error_message: Some(error),
    }
}

fn notice_subject(target: &PremiumNoticeTarget) -> ListingSubject<'_> {
    ListingSubject {
        property_id: target.property_id,
        property_title: &target.property_title,
    }
}

fn plan_name(plan_type: &str) -> String {
    plan_type
        .parse::<PlanType>()
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|_| plan_type.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    use super::*;
    use crate::delivery::email::EmailError;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::Build("relay unavailable".into()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn notifier(mailer: Arc<RecordingMailer>) -> Notifier {
        Notifier::new(mailer, EmailTemplates::new("https://estate.example").unwrap())
    }

    fn target(now: Timestamp) -> PremiumNoticeTarget {
        PremiumNoticeTarget {
            listing_id: 4,
            property_id: 11,
            property_title: "Hillside Bungalow".into(),
            plan_type: "featured".into(),
            end_date: now + Duration::days(3) + Duration::hours(2),
            user_id: 2,
            username: "hari".into(),
            email: "hari@example.com".into(),
        }
    }

    #[tokio::test]
    async fn expiring_notice_is_sent_and_logged() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let entry = notifier(mailer.clone()).premium_expiring(&target(now), now).await;

        assert!(entry.is_sent);
        assert_eq!(entry.notification_type, "premium_expiring");
        assert_eq!(entry.user_id, Some(2));
        assert_eq!(entry.recipient, "hari@example.com");
        assert!(entry.error_message.is_none());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].subject,
            "Your premium listing expires in 3 day(s): Hillside Bungalow"
        );
        assert!(sent[0].body.contains("Featured Listing plan"));
        assert!(sent[0]
            .body
            .contains("https://estate.example/premium/plans?plan=featured&property=11"));
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_raised() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let entry = notifier(mailer).premium_expired(&target(now)).await;

        assert!(!entry.is_sent);
        assert!(entry.sent_at.is_none());
        assert_eq!(entry.error_message.as_deref(), Some("Email build error: relay unavailable"));
        assert_eq!(entry.subject, "Your premium listing has expired: Hillside Bungalow");
    }

    #[tokio::test]
    async fn payment_failure_mentions_amount_and_reason() {
        let mailer = Arc::new(RecordingMailer::default());
        let to = Recipient::new(9, "Gita Sharma", "gita@example.com");
        let entry = notifier(mailer)
            .payment_failed(
                &to,
                ListingSubject {
                    property_id: 5,
                    property_title: "City Flat",
                },
                PlanType::Premium,
                Decimal::new(400000, 2),
                "PAY_ABCDEFGH",
                "Insufficient funds",
            )
            .await;

        assert!(entry.is_sent);
        assert!(entry.message.contains("NPR 4000.00"));
        assert!(entry.message.contains("Reason: Insufficient funds"));
        assert!(entry.message.starts_with("Hello Gita Sharma,"));
    }

    #[tokio::test]
    async fn moderation_notice_includes_reason_when_given() {
        let mailer = Arc::new(RecordingMailer::default());
        let to = Recipient::new(3, "owner", "owner@example.com");
        let subject = ListingSubject {
            property_id: 1,
            property_title: "Flat",
        };
        let n = notifier(mailer);

        let rejected = n
            .image_moderated(&to, subject, 12, "rejected", Some("Watermarked stock photo"))
            .await;
        assert!(rejected.message.contains("Reason: Watermarked stock photo"));

        let approved = n.image_moderated(&to, subject, 12, "approved", Some("  ")).await;
        assert!(!approved.message.contains("Reason:"));
        assert_eq!(approved.subject, "An image on Flat was approved");
    }

    #[test]
    fn unknown_plan_name_passes_through() {
        assert_eq!(plan_name("basic"), "Basic Premium");
        assert_eq!(plan_name("legacy"), "legacy");
    }
}
