/// State management module
///
/// The session record and its state machine (session.rs). Only the UI
/// thread touches it; workers report back through messages.

pub mod session;

pub use session::{Effect, Event, Notification, NotificationKind, Outcome, Session, Slot};
