//! Email templates, one subject and one body per notification kind.
//!
//! Templates are plain-text tera sources registered under
//! `"<kind>.subject"` and `"<kind>.body"`. The notifier fills the context; the
//! templates only interpolate it.

use std::fmt;

use estate_db::models::notification::{
    NOTIFY_IMAGE_MODERATED, NOTIFY_PAYMENT_FAILED, NOTIFY_PREMIUM_ACTIVATED,
    NOTIFY_PREMIUM_EXPIRED, NOTIFY_PREMIUM_EXPIRING,
};
use tera::{Context, Tera};

const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    PremiumActivated,
    PremiumExpiring,
    PremiumExpired,
    PaymentFailed,
    ImageModerated,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::PremiumActivated,
        NotificationKind::PremiumExpiring,
        NotificationKind::PremiumExpired,
        NotificationKind::PaymentFailed,
        NotificationKind::ImageModerated,
    ];

    /// Value stored in `email_notifications.notification_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PremiumActivated => NOTIFY_PREMIUM_ACTIVATED,
            Self::PremiumExpiring => NOTIFY_PREMIUM_EXPIRING,
            Self::PremiumExpired => NOTIFY_PREMIUM_EXPIRED,
            Self::PaymentFailed => NOTIFY_PAYMENT_FAILED,
            Self::ImageModerated => NOTIFY_IMAGE_MODERATED,
        }
    }

    fn subject_template(self) -> &'static str {
        match self {
            Self::PremiumActivated => "Your premium listing is live: {{ property_title }}",
            Self::PremiumExpiring => {
                "Your premium listing expires in {{ days_remaining }} day(s): {{ property_title }}"
            }
            Self::PremiumExpired => "Your premium listing has expired: {{ property_title }}",
            Self::PaymentFailed => "Payment failed for {{ property_title }}",
            Self::ImageModerated => "An image on {{ property_title }} was {{ action }}",
        }
    }

    fn body_template(self) -> &'static str {
        match self {
            Self::PremiumActivated => PREMIUM_ACTIVATED_BODY,
            Self::PremiumExpiring => PREMIUM_EXPIRING_BODY,
            Self::PremiumExpired => PREMIUM_EXPIRED_BODY,
            Self::PaymentFailed => PAYMENT_FAILED_BODY,
            Self::ImageModerated => IMAGE_MODERATED_BODY,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PREMIUM_ACTIVATED_BODY: &str = "Hello {{ user_name }},

Your {{ plan_name }} plan for \"{{ property_title }}\" is now active.

Amount paid: NPR {{ amount }}
Payment ID: {{ payment_id }}
Active from {{ start_date }} until {{ end_date }}.

Manage your listings: {{ dashboard_url }}
";

const PREMIUM_EXPIRING_BODY: &str = "Hello {{ user_name }},

The {{ plan_name }} plan for \"{{ property_title }}\" ends on {{ end_date }} \
({{ days_remaining }} day(s) left).

Renew to keep your listing at the top of search results: {{ renewal_url }}
";

const PREMIUM_EXPIRED_BODY: &str = "Hello {{ user_name }},

The {{ plan_name }} plan for \"{{ property_title }}\" ended on {{ end_date }} and the \
listing is no longer featured.

See available plans: {{ plans_url }}
";

const PAYMENT_FAILED_BODY: &str = "Hello {{ user_name }},

We could not complete the payment of NPR {{ amount }} for the {{ plan_name }} plan \
on \"{{ property_title }}\".

Payment ID: {{ payment_id }}
Reason: {{ error }}

No charge was applied. You can try again here: {{ checkout_url }}
";

const IMAGE_MODERATED_BODY: &str = "Hello {{ user_name }},

Image #{{ image_id }} on \"{{ property_title }}\" was {{ action }} by our moderators.
{% if reason %}
Reason: {{ reason }}
{% endif %}
Review your listing: {{ property_url }}
";

/// A rendered subject/body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Compiled notification templates plus the public site URL used to build
/// links in them.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    site_url: String,
    tera: Tera,
}

impl EmailTemplates {
    pub fn new(site_url: impl Into<String>) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        let sources: Vec<(String, &str)> = NotificationKind::ALL
            .iter()
            .flat_map(|kind| {
                [
                    (format!("{kind}.subject"), kind.subject_template()),
                    (format!("{kind}.body"), kind.body_template()),
                ]
            })
            .collect();
        tera.add_raw_templates(sources)?;

        Ok(Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            tera,
        })
    }

    /// `SITE_URL` or `http://localhost:3000`.
    pub fn from_env() -> Result<Self, tera::Error> {
        Self::new(std::env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()))
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Absolute link for a site path starting with `/`.
    pub fn link(&self, path: &str) -> String {
        format!("{}{path}", self.site_url)
    }

    /// Render the subject and body of `kind`. The subject is collapsed onto one
    /// line.
    pub fn render(
        &self,
        kind: NotificationKind,
        context: &Context,
    ) -> Result<RenderedEmail, tera::Error> {
        let subject = self.tera.render(&format!("{kind}.subject"), context)?;
        let body = self.tera.render(&format!("{kind}.body"), context)?;
        Ok(RenderedEmail {
            subject: subject.split_whitespace().collect::<Vec<_>>().join(" "),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> EmailTemplates {
        EmailTemplates::new("https://estate.example/").unwrap()
    }

    #[test]
    fn site_url_trailing_slash_trimmed() {
        let t = templates();
        assert_eq!(t.site_url(), "https://estate.example");
        assert_eq!(t.link("/premium/plans"), "https://estate.example/premium/plans");
    }

    #[test]
    fn renders_expiring_notice() {
        let mut ctx = Context::new();
        ctx.insert("user_name", "Sita");
        ctx.insert("property_title", "Lakeside Villa");
        ctx.insert("plan_name", "Featured");
        ctx.insert("end_date", "March 03, 2025");
        ctx.insert("days_remaining", &3);
        ctx.insert("renewal_url", "https://estate.example/premium/plans");

        let email = templates().render(NotificationKind::PremiumExpiring, &ctx).unwrap();
        assert_eq!(
            email.subject,
            "Your premium listing expires in 3 day(s): Lakeside Villa"
        );
        assert!(email.body.starts_with("Hello Sita,"));
        assert!(email.body.contains("ends on March 03, 2025"));
    }

    #[test]
    fn optional_reason_is_omitted() {
        let mut ctx = Context::new();
        ctx.insert("user_name", "Ram");
        ctx.insert("property_title", "Flat");
        ctx.insert("image_id", &7);
        ctx.insert("action", "approved");
        ctx.insert("reason", &Option::<String>::None);
        ctx.insert("property_url", "https://estate.example/properties/1");

        let email = templates().render(NotificationKind::ImageModerated, &ctx).unwrap();
        assert_eq!(email.subject, "An image on Flat was approved");
        assert!(!email.body.contains("Reason:"));
    }

    #[test]
    fn missing_variable_is_an_error() {
        let ctx = Context::new();
        assert!(templates().render(NotificationKind::PremiumExpired, &ctx).is_err());
    }

    #[test]
    fn kinds_map_to_stored_names() {
        assert_eq!(NotificationKind::PaymentFailed.as_str(), "payment_failed");
        assert_eq!(NotificationKind::PremiumActivated.to_string(), "premium_activated");
    }
}
