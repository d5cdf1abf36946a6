use crate::{
    acl::{acl_read, AccessControlEntry, AccessControlled},
    auth::session_user,
    index::Navbar,
    saved_view::SavedView,
    sketch::{
        component::SketchForm,
        core::{sketch_explore, sketch_read_with_children, Sketch},
    },
    timeline::SketchTimeline,
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError,
    handler,
    session::Session,
    web::{Data, Html, Path, Query},
    IntoResponse, Request, Response,
};
use serde::Deserialize;
use sqlx::PgPool;

/// Template for the sketch overview
#[derive(Template)]
#[template(path = "sketch/page/sketch.html")]
struct SketchOverview {
    navbar: Navbar,
    sketch: Sketch,
    timelines: Vec<SketchTimeline>,
    views: Vec<SavedView>,
    is_owner: bool,
    public: bool,
}

/// Sketch overview page
#[handler]
pub async fn sketch(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let children = sketch_read_with_children(&mut tx, sketch_id, &username).await?;

    let sketch_overview: String = SketchOverview {
        is_owner: children.sketch.is_owner(&username),
        navbar: Navbar {
            username: Some(username),
        },
        sketch: children.sketch,
        timelines: children.timelines,
        views: children.views,
        public: children.public,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_overview).into_response())
}

/// Template for the saved views of a sketch
#[derive(Template)]
#[template(path = "sketch/page/views.html")]
struct SketchViews {
    navbar: Navbar,
    sketch: Sketch,
    views: Vec<SavedView>,
}

/// Saved views page
#[handler]
pub async fn views(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let children = sketch_read_with_children(&mut tx, sketch_id, &username).await?;

    let sketch_views: String = SketchViews {
        navbar: Navbar {
            username: Some(username),
        },
        sketch: children.sketch,
        views: children.views,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_views).into_response())
}

/// Template for the timelines attached to a sketch
#[derive(Template)]
#[template(path = "sketch/page/timelines.html")]
struct SketchTimelines {
    navbar: Navbar,
    sketch: Sketch,
    timelines: Vec<SketchTimeline>,
}

/// Attached timelines page
#[handler]
pub async fn timelines(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let children = sketch_read_with_children(&mut tx, sketch_id, &username).await?;

    let sketch_timelines: String = SketchTimelines {
        navbar: Navbar {
            username: Some(username),
        },
        sketch: children.sketch,
        timelines: children.timelines,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_timelines).into_response())
}

/// Template for the sketch settings
#[derive(Template)]
#[template(path = "sketch/page/settings.html")]
struct SketchSettings {
    navbar: Navbar,
    sketch: Sketch,
    public: bool,
    is_owner: bool,
    acl: Vec<AccessControlEntry>,
}

/// Sharing settings page
#[handler]
pub async fn settings(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let children = sketch_read_with_children(&mut tx, sketch_id, &username).await?;
    let acl = acl_read(&mut tx, &children.sketch).await?;

    let sketch_settings: String = SketchSettings {
        is_owner: children.sketch.is_owner(&username),
        navbar: Navbar {
            username: Some(username),
        },
        sketch: children.sketch,
        public: children.public,
        acl,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_settings).into_response())
}

/// Saved view to start exploring from, 0 for none
#[derive(Deserialize)]
pub struct ExploreQuery {
    #[serde(default)]
    view: i32,
}

/// Template for the explore page
#[derive(Template)]
#[template(path = "sketch/page/explore.html")]
struct SketchExplorePage {
    navbar: Navbar,
    sketch: Sketch,
    indices: String,
    view: Option<SavedView>,
}

/// Explore the events of the attached timelines
#[handler]
pub async fn explore(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    Query(explore_query): Query<ExploreQuery>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let explored = sketch_explore(&mut tx, sketch_id, explore_query.view, &username).await?;

    let sketch_explore: String = SketchExplorePage {
        navbar: Navbar {
            username: Some(username),
        },
        sketch: explored.sketch,
        indices: explored.indices,
        view: explored.view,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_explore).into_response())
}

/// Template for a single event of the sketch
#[derive(Template)]
#[template(path = "sketch/page/event.html")]
struct SketchEvent {
    navbar: Navbar,
    sketch: Sketch,
    indices: String,
}

/// Event detail page. The event itself is fetched from the datastore by the browser.
#[handler]
pub async fn event(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let explored = sketch_explore(&mut tx, sketch_id, 0, &username).await?;

    let sketch_event: String = SketchEvent {
        navbar: Navbar {
            username: Some(username),
        },
        sketch: explored.sketch,
        indices: explored.indices,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_event).into_response())
}

/// Template for the new sketch page
#[derive(Template)]
#[template(path = "sketch/page/add_sketch.html")]
pub struct AddSketch {
    pub navbar: Navbar,
    pub sketch_form: SketchForm,
}

/// New sketch page
#[handler]
pub fn add_sketch(session: &Session, req: &Request) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let add_sketch: String = AddSketch {
        navbar: Navbar {
            username: Some(username),
        },
        sketch_form: SketchForm { error: None },
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(add_sketch).into_response())
}
