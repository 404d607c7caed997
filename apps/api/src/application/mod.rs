// Job-application intake: record shape, field validation, HTTP handlers.

pub mod handlers;
pub mod models;
pub mod validation;
