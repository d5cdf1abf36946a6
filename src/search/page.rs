use crate::{
    auth::session_user,
    index::Navbar,
    search::core::{search_sketch_read, SearchSketch},
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError,
    get, handler,
    session::Session,
    web::{Data, Html, Query},
    IntoResponse, Request, Response, Route,
};
use serde::Deserialize;
use sqlx::PgPool;

/// Query string of the search page
#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    page: u64,
}

/// Template for Sketch Search Page
#[derive(Template)]
#[template(path = "search/page/search.html")]
struct SketchSearch {
    navbar: Navbar,
    query: String,
    search: SearchSketch,
}

/// Sketch search page
#[handler]
async fn search(
    Data(pool): Data<&PgPool>,
    Query(search_query): Query<SearchQuery>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let search =
        search_sketch_read(&mut tx, &search_query.query, &username, &search_query.page).await?;

    // Render HTML
    let sketch_search: String = SketchSearch {
        navbar: Navbar {
            username: Some(username),
        },
        query: search_query.query,
        search,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(sketch_search).into_response())
}

/// Add the search page
pub fn route(route: Route) -> Route {
    route.at("/search", get(search))
}
