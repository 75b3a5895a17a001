//! Email provider abstractions and implementations

mod gmail;
mod mailgun;
mod traits;

#[cfg(test)]
pub mod mock;

pub use gmail::GmailProvider;
pub use mailgun::MailgunProvider;
pub use traits::*;

#[cfg(test)]
pub use mock::MockEmailProvider;
