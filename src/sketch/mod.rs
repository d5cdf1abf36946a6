mod api;
mod component;
mod core;
mod db;
mod page;
mod route;

pub use crate::sketch::{
    api::SketchApi,
    core::{
        sketch_add, sketch_read, sketch_read_owned, sketch_read_shared, Sketch, SketchParam,
    },
    route::route,
};
