mod api;
mod component;
mod core;
mod db;
mod page;
mod route;

pub use crate::timeline::{
    api::TimelineApi,
    core::{sketch_timeline_add, timeline_add, SketchTimeline, Timeline, TimelineParam},
    db::sketch_timeline_select_by_sketch,
    route::route,
};
