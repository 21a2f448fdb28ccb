pub mod contacts;
pub mod error;
pub mod meeting;
pub mod tools;
