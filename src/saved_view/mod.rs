mod api;
mod core;
mod db;

pub use crate::saved_view::{
    api::SavedViewApi,
    core::{saved_view_add, SavedView, SavedViewParam},
    db::{saved_view_select, saved_view_select_by_sketch},
};
