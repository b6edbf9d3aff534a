pub mod contracts;
pub mod reminders;
pub mod user;
