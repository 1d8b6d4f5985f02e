//! Notification infrastructure for the listing platform.
//!
//! - [`delivery`]: outbound channels. [`Mailer`] is the seam; [`SmtpMailer`]
//!   talks to a relay and [`LogMailer`] only writes to the log.
//! - [`EmailTemplates`]: subject and body templates per notification kind.
//! - [`Notifier`]: renders, sends and reports the outcome of one notification
//!   so callers can persist it in `email_notifications`.

pub mod delivery;
pub mod notifier;
pub mod templates;

pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use notifier::{ListingSubject, Notifier, Recipient};
pub use templates::{EmailTemplates, NotificationKind, RenderedEmail};
