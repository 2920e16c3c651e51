pub mod cookies;
pub mod export;
pub mod jwt;
pub mod storage;
pub mod uploads;
pub mod users;
pub mod workshops;
