// src/ingest/providers/mod.rs
pub mod html_links;
pub mod rss;
