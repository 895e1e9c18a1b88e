//! Model catalogs, downloads and shared model handles.

pub mod catalog;
pub mod download;
pub mod lazy;
pub mod summary_catalog;
