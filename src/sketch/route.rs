use crate::sketch::{
    component::{sharing_form, sketch_form},
    page::{add_sketch, event, explore, settings, sketch, timelines, views},
};
use poem::{get, post, Route};

/// Add the sketch pages
pub fn route(route: Route) -> Route {
    route
        .at("/sketch/add", get(add_sketch).post(sketch_form))
        .at("/sketch/:sketch_id", get(sketch))
        .at("/sketch/:sketch_id/views", get(views))
        .at("/sketch/:sketch_id/timelines", get(timelines))
        .at("/sketch/:sketch_id/settings", get(settings))
        .at("/sketch/:sketch_id/settings/sharing", post(sharing_form))
        .at("/sketch/:sketch_id/explore", get(explore))
        .at("/sketch/:sketch_id/explore/event", get(event))
}
