//! Helper functions shared by the content mappers and templates

mod date;
mod html;

pub use date::*;
pub use html::*;
