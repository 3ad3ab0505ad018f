//! Database access layer for cmdanno-web

pub mod annotations;
pub mod content;
pub mod progress;
pub mod users;
