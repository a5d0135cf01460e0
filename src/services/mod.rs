//! Paste storage core: persistence, ownership correlation and paging.

pub mod archive;
pub mod error;
pub mod ownership;
pub mod pagination;
pub mod paste_service;
pub mod paste_store;
