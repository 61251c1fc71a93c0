//! HTTP handlers, one module per resource

pub mod auth;
pub mod job_postings;
pub mod magazines;
pub mod posts;
pub mod system;
pub mod taxonomy;
pub mod tea_ratings;
