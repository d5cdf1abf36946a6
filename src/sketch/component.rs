use crate::{
    auth::session_user,
    index::Navbar,
    sketch::{
        core::{sketch_add, sketch_share, SketchParam},
        page::AddSketch,
    },
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError,
    handler,
    session::Session,
    web::{Data, Form, Html, Path},
    IntoResponse, Request, Response,
};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

/// Template for the new sketch form
#[derive(Template)]
#[template(path = "sketch/component/sketch_form.html")]
pub struct SketchForm {
    pub error: Option<String>,
}

/// Create the sketch posted by the new sketch form
#[handler]
pub async fn sketch_form(
    Data(pool): Data<&PgPool>,
    Form(sketch_param): Form<SketchParam>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    if sketch_param.validate().is_err() {
        let add_sketch: String = AddSketch {
            navbar: Navbar {
                username: Some(username),
            },
            sketch_form: SketchForm {
                error: Some("Title must be between 1 and 255 characters".to_string()),
            },
        }
        .render()
        .map_err(InternalServerError)?;

        return Ok(Html(add_sketch).into_response());
    }

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let sketch = sketch_add(&mut tx, &sketch_param, &username).await?;
    tx.commit().await.map_err(InternalServerError)?;

    Ok(redirect(&format!("/sketch/{}", sketch.id)))
}

/// Sharing radio buttons of the settings page
#[derive(Deserialize)]
pub struct SharingParams {
    #[serde(rename = "optionsPermission")]
    permission: String,
}

/// Apply the sharing setting picked on the settings page
#[handler]
pub async fn sharing_form(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    Form(params): Form<SharingParams>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let mut tx = pool.begin().await.map_err(InternalServerError)?;
    let sketch = sketch_share(&mut tx, sketch_id, &params.permission, &username).await?;
    tx.commit().await.map_err(InternalServerError)?;

    Ok(redirect(&format!("/sketch/{}", sketch.id)))
}
