use crate::{
    auth::session_user,
    sketch::{sketch_read_owned, sketch_read_shared, Sketch},
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError,
    handler,
    session::Session,
    web::{Data, Html},
    IntoResponse, Request, Response,
};
use sqlx::PgPool;

/// Template for the navigation bar at the top of every page
#[derive(Template)]
#[template(path = "index/component/navbar.html")]
pub struct Navbar {
    pub username: Option<String>,
}

/// Template for the landing page
#[derive(Template)]
#[template(path = "index/page/index.html")]
struct Index {
    navbar: Navbar,
    my_sketches: Vec<Sketch>,
    shared_sketches: Vec<Sketch>,
}

/// Landing page with the user's own sketches and the ones shared with them
#[handler]
pub async fn index(
    Data(pool): Data<&PgPool>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let my_sketches = sketch_read_owned(&mut tx, &username).await?;
    let shared_sketches = sketch_read_shared(&mut tx, &username).await?;

    let index: String = Index {
        navbar: Navbar {
            username: Some(username),
        },
        my_sketches,
        shared_sketches,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(index).into_response())
}
