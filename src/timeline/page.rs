use crate::{
    auth::session_user,
    index::Navbar,
    sketch::{sketch_read, Sketch},
    timeline::core::{sketch_timeline_read, timeline_read_addable, SketchTimeline, Timeline},
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError,
    handler,
    session::Session,
    web::{Data, Html, Path},
    IntoResponse, Request, Response,
};
use sqlx::PgPool;

/// Template to pick timelines to attach
#[derive(Template)]
#[template(path = "timeline/page/add_timeline.html")]
struct AddTimeline {
    navbar: Navbar,
    sketch: Sketch,
    timelines: Vec<Timeline>,
}

/// Pick timelines to add to a sketch
#[handler]
pub async fn add_timeline(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let sketch = sketch_read(&mut tx, sketch_id, &username).await?;
    let timelines = timeline_read_addable(&mut tx, &sketch, &username).await?;

    let add_timeline: String = AddTimeline {
        navbar: Navbar {
            username: Some(username),
        },
        sketch,
        timelines,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(add_timeline).into_response())
}

/// Template to recolor an attached timeline
#[derive(Template)]
#[template(path = "timeline/page/edit_timeline.html")]
struct EditTimeline {
    navbar: Navbar,
    sketch: Sketch,
    timeline: SketchTimeline,
}

/// Recolor an attached timeline
#[handler]
pub async fn edit_timeline(
    Data(pool): Data<&PgPool>,
    Path((sketch_id, sketch_timeline_id)): Path<(i32, i32)>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let sketch = sketch_read(&mut tx, sketch_id, &username).await?;
    let timeline = sketch_timeline_read(&mut tx, sketch.id, sketch_timeline_id, &username).await?;

    let edit_timeline: String = EditTimeline {
        navbar: Navbar {
            username: Some(username),
        },
        sketch,
        timeline,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(edit_timeline).into_response())
}
