//! Data models for the Libris server

pub mod book;
pub mod librarian;
pub mod patron;
