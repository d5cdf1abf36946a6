mod api;
mod core;
mod db;
mod page;

pub use crate::search::{api::SearchApi, page::route};
