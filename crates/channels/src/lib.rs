//! Campaign channels — content generation and the delivery connectors
//! (email, CRM log, team chat) the campaign runner drives.

pub mod content;
pub mod crm;
pub mod email;
pub mod notify;

pub use content::{ContentGenerator, TemplateContentGenerator};
pub use crm::{CrmLogger, InMemoryCrmLog};
pub use email::{EmailConnector, EmailDelivery, EmailTransport, LoggingTransport};
pub use notify::{CaptureNotifier, ChatNotifier, LogNotifier};
