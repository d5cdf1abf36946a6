use crate::{
    auth::session_user,
    timeline::core::{color_validater, sketch_timeline_add, sketch_timeline_edit_color, ColorParam},
    util::redirect,
};
use poem::{
    error::InternalServerError,
    handler,
    http::StatusCode,
    session::Session,
    web::{Data, Form, Path},
    Request, Response,
};
use sqlx::PgPool;

/// Attach the timelines ticked in the add timeline form
#[handler]
pub async fn add_timeline_form(
    Data(pool): Data<&PgPool>,
    Path(sketch_id): Path<i32>,
    Form(fields): Form<Vec<(String, String)>>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    // The form repeats the "timelines" field once per ticked box
    let timeline_ids = fields
        .iter()
        .filter(|(name, _)| name == "timelines")
        .map(|(_, value)| value.parse::<i32>())
        .collect::<Result<Vec<i32>, _>>()
        .map_err(|_| poem::Error::from_string("invalid timeline id", StatusCode::BAD_REQUEST))?;

    if !timeline_ids.is_empty() {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        sketch_timeline_add(&mut tx, sketch_id, &timeline_ids, &username).await?;
        tx.commit().await.map_err(InternalServerError)?;
    }

    Ok(redirect(&format!("/sketch/{sketch_id}/timelines")))
}

/// Save the color picked in the edit timeline form. Anything that is not a hex color is ignored.
#[handler]
pub async fn edit_timeline_form(
    Data(pool): Data<&PgPool>,
    Path((sketch_id, sketch_timeline_id)): Path<(i32, i32)>,
    Form(color_param): Form<ColorParam>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    if color_validater(&color_param.color).is_ok() {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        sketch_timeline_edit_color(
            &mut tx,
            sketch_id,
            sketch_timeline_id,
            &color_param,
            &username,
        )
        .await?;
        tx.commit().await.map_err(InternalServerError)?;
    }

    Ok(redirect(&format!("/sketch/{sketch_id}/timelines")))
}
