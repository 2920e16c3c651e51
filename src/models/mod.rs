pub mod attachments;
pub mod requests;
pub mod users;
pub mod workshops;
