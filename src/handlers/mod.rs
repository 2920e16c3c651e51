pub mod auth;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod home;
pub mod uploads;
pub mod workshops;
