pub mod accounts;
pub mod admin;
pub mod analytics;
pub mod blog;
pub mod contact;
pub mod images;
pub mod legal;
pub mod pages;
pub mod premium;
pub mod properties;
