//! Content module - view models mapped from CMS documents

mod post;
pub mod richtext;

pub use post::{PostDetail, PostPagination, PostSummary, Section};
