use crate::timeline::{
    component::{add_timeline_form, edit_timeline_form},
    page::{add_timeline, edit_timeline},
};
use poem::{get, Route};

/// Add the pages to attach and recolor timelines
pub fn route(route: Route) -> Route {
    route
        .at(
            "/sketch/:sketch_id/timelines/add",
            get(add_timeline).post(add_timeline_form),
        )
        .at(
            "/sketch/:sketch_id/timelines/:sketch_timeline_id",
            get(edit_timeline).post(edit_timeline_form),
        )
}
