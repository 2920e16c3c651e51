pub mod attachments;
pub mod dashboard;
pub mod users;
pub mod workshops;
