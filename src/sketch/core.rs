use crate::{
    acl::{
        acl_remove_all, can_read, is_public, make_private, make_public, require_owner,
        AccessControlled, ObjectType,
    },
    saved_view::{saved_view_select, saved_view_select_by_sketch, SavedView},
    sketch::db::{
        sketch_drop, sketch_insert, sketch_select, sketch_select_by_owner,
        sketch_select_shared, sketch_update,
    },
    timeline::{sketch_timeline_select_by_sketch, SketchTimeline},
};
use chrono::{DateTime, Utc};
use poem::{
    error::{BadRequest, InternalServerError},
    http::StatusCode,
};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction};
use validator::Validate;

/// Investigation workspace
#[derive(Debug, FromRow, Object)]
pub struct Sketch {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub created_date: DateTime<Utc>,
    pub modified_by: String,
    pub modified_date: DateTime<Utc>,
}

impl AccessControlled for Sketch {
    fn object_type(&self) -> ObjectType {
        ObjectType::Sketch
    }

    fn object_id(&self) -> i32 {
        self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

/// How to create or update a sketch
#[derive(Debug, Deserialize, Object, Serialize, Validate)]
pub struct SketchParam {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: String,
}

/// Sketch with its timelines and saved views
#[derive(Object)]
pub struct SketchChildren {
    pub sketch: Sketch,
    pub public: bool,
    pub timelines: Vec<SketchTimeline>,
    pub views: Vec<SavedView>,
}

/// The user's own sketches and those shared with them
#[derive(Object)]
pub struct SketchList {
    pub my_sketches: Vec<Sketch>,
    pub shared_sketches: Vec<Sketch>,
}

/// What the explore page needs to query the datastore
#[derive(Debug)]
pub struct SketchExplore {
    pub sketch: Sketch,
    pub indices: String,
    pub view: Option<SavedView>,
}

/// Add a sketch owned by the user
pub async fn sketch_add(
    tx: &mut Transaction<'_, Postgres>,
    sketch_param: &SketchParam,
    username: &str,
) -> Result<Sketch, poem::Error> {
    // Make sure the payload we got is good (check with Validate package).
    sketch_param.validate().map_err(BadRequest)?;

    let sketch = sketch_insert(tx, sketch_param, username)
        .await
        .map_err(InternalServerError)?;

    tracing::info!(sketch_id = sketch.id, owner = %sketch.owner, "sketch created");

    Ok(sketch)
}

/// Read a sketch the user has access to
pub async fn sketch_read(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    username: &str,
) -> Result<Sketch, poem::Error> {
    let select = sketch_select(tx, sketch_id).await;

    let sketch = match select {
        Ok(sketch) => sketch,
        Err(sqlx::Error::RowNotFound) => {
            return Err(poem::Error::from_string(
                "sketch does not exist",
                StatusCode::NOT_FOUND,
            ))
        }
        Err(err) => return Err(InternalServerError(err)),
    };

    match can_read(tx, &sketch, username).await? {
        true => Ok(sketch),
        false => Err(poem::Error::from_string(
            "user does not have access to this sketch",
            StatusCode::FORBIDDEN,
        )),
    }
}

/// Edit a sketch the user owns
pub async fn sketch_edit(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_param: &SketchParam,
    username: &str,
) -> Result<Sketch, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;
    require_owner(&sketch, username)?;

    // Make sure the payload we got is good (check with Validate package).
    sketch_param.validate().map_err(BadRequest)?;

    sketch_update(tx, sketch.id, sketch_param, username)
        .await
        .map_err(InternalServerError)
}

/// Remove a sketch the user owns, along with everything hanging off of it
pub async fn sketch_remove(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    username: &str,
) -> Result<Sketch, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;
    require_owner(&sketch, username)?;

    acl_remove_all(tx, &sketch).await?;
    let sketch = sketch_drop(tx, sketch.id)
        .await
        .map_err(InternalServerError)?;

    tracing::info!(sketch_id = sketch.id, username, "sketch removed");

    Ok(sketch)
}

/// Sketches the user owns
pub async fn sketch_read_owned(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<Vec<Sketch>, poem::Error> {
    sketch_select_by_owner(tx, username)
        .await
        .map_err(InternalServerError)
}

/// Sketches other users shared with the user
pub async fn sketch_read_shared(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<Vec<Sketch>, poem::Error> {
    sketch_select_shared(tx, username)
        .await
        .map_err(InternalServerError)
}

/// Both lists for the landing page
pub async fn sketch_read_list(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<SketchList, poem::Error> {
    Ok(SketchList {
        my_sketches: sketch_read_owned(tx, username).await?,
        shared_sketches: sketch_read_shared(tx, username).await?,
    })
}

/// Read a sketch along with its timelines and saved views
pub async fn sketch_read_with_children(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    username: &str,
) -> Result<SketchChildren, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    let public = is_public(tx, &sketch).await?;

    let timelines = sketch_timeline_select_by_sketch(tx, sketch.id)
        .await
        .map_err(InternalServerError)?;

    let views = saved_view_select_by_sketch(tx, sketch.id)
        .await
        .map_err(InternalServerError)?;

    Ok(SketchChildren {
        sketch,
        public,
        timelines,
        views,
    })
}

/// Gather the datastore indices to search and the saved view to start from. A view of 0
/// means no saved view.
pub async fn sketch_explore(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    view_id: i32,
    username: &str,
) -> Result<SketchExplore, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    let timelines = sketch_timeline_select_by_sketch(tx, sketch.id)
        .await
        .map_err(InternalServerError)?;

    let indices = timelines
        .iter()
        .map(|timeline| timeline.datastore_index.as_str())
        .collect::<Vec<&str>>()
        .join(",");

    let view = match view_id {
        0 => None,
        view_id => match saved_view_select(tx, sketch.id, view_id).await {
            Ok(view) => Some(view),
            Err(sqlx::Error::RowNotFound) => {
                return Err(poem::Error::from_string(
                    "saved view does not exist",
                    StatusCode::NOT_FOUND,
                ))
            }
            Err(err) => return Err(InternalServerError(err)),
        },
    };

    Ok(SketchExplore {
        sketch,
        indices,
        view,
    })
}

/// Sharing setting posted by the settings page: "public" opens the sketch to everyone,
/// anything else makes it private.
pub async fn sketch_share(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    permission: &str,
    username: &str,
) -> Result<Sketch, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    match permission {
        "public" => make_public(tx, &sketch, username).await?,
        _ => make_private(tx, &sketch, username).await?,
    };

    Ok(sketch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        acl::{grant_read, AclParam},
        saved_view::{saved_view_add, SavedViewParam},
        sketch::util::test_utils::gen_test_sketch_param,
        timeline::sketch_timeline_add,
        util::test_utils::{gen_test_user_creds, post_test_sketch, post_test_timeline},
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sqlx::PgPool;

    /// Share a sketch with a user
    async fn share(pool: &PgPool, sketch: &Sketch, grantee: &str) {
        let acl_param = AclParam {
            username: grantee.to_string(),
        };
        let user_creds = gen_test_user_creds(&["alice", "bob", "carol"]);

        let mut tx = pool.begin().await.unwrap();
        grant_read(&mut tx, sketch, &acl_param, &user_creds, &sketch.owner)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    /// Test create sketch
    #[sqlx::test]
    async fn test_sketch_add(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("Intrusion");
        let sketch = sketch_add(&mut tx, &sketch_param, "alice").await.unwrap();

        assert_eq!(sketch.id, 1);
        assert_eq!(sketch.title, "Intrusion");
        assert_eq!(sketch.owner, "alice");
    }

    /// Test create sketch without a title
    #[sqlx::test]
    async fn test_sketch_add_bad_title(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("");
        let err = sketch_add(&mut tx, &sketch_param, "alice")
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    /// Test reading follows the access control entries
    #[sqlx::test]
    async fn test_sketch_read(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;

        let mut tx = pool.begin().await.unwrap();

        let read = sketch_read(&mut tx, sketch.id, "alice").await.unwrap();
        assert_eq!(read.title, "Intrusion");

        let err = sketch_read(&mut tx, sketch.id, "bob").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(format!("{err}"), "user does not have access to this sketch");

        let err = sketch_read(&mut tx, 42, "alice").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(format!("{err}"), "sketch does not exist");
    }

    /// Test reading a shared and a public sketch
    #[sqlx::test]
    async fn test_sketch_read_shared_public(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;
        share(&pool, &sketch, "bob").await;

        {
            let mut tx = pool.begin().await.unwrap();
            sketch_read(&mut tx, sketch.id, "bob").await.unwrap();
            sketch_read(&mut tx, sketch.id, "carol").await.unwrap_err();
        }

        {
            let mut tx = pool.begin().await.unwrap();
            make_public(&mut tx, &sketch, "alice").await.unwrap();
            tx.commit().await.unwrap();
        }

        let mut tx = pool.begin().await.unwrap();
        sketch_read(&mut tx, sketch.id, "carol").await.unwrap();
    }

    /// Test only the owner can edit
    #[sqlx::test]
    async fn test_sketch_edit(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;
        share(&pool, &sketch, "bob").await;

        let mut tx = pool.begin().await.unwrap();
        let sketch_param = gen_test_sketch_param("Exfiltration");

        let err = sketch_edit(&mut tx, sketch.id, &sketch_param, "bob")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        // Ownership is checked before the payload
        let bad_param = gen_test_sketch_param("");
        let err = sketch_edit(&mut tx, sketch.id, &bad_param, "bob")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = sketch_edit(&mut tx, sketch.id, &bad_param, "alice")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let edited = sketch_edit(&mut tx, sketch.id, &sketch_param, "alice")
            .await
            .unwrap();
        assert_eq!(edited.title, "Exfiltration");
        assert_eq!(edited.modified_by, "alice");
    }

    /// Test removing a sketch takes its children and entries with it
    #[sqlx::test]
    async fn test_sketch_remove(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;
        let timeline = post_test_timeline("plaso_disk", "alice", &pool).await;
        share(&pool, &sketch, "bob").await;

        {
            let mut tx = pool.begin().await.unwrap();
            sketch_timeline_add(&mut tx, sketch.id, &[timeline.id], "alice")
                .await
                .unwrap();
            let view_param = SavedViewParam {
                name: "Logins".to_string(),
                query: "event_id:4624".to_string(),
                filter: json!({}),
            };
            saved_view_add(&mut tx, sketch.id, &view_param, "alice")
                .await
                .unwrap();
            tx.commit().await.unwrap();
        }

        let mut tx = pool.begin().await.unwrap();

        let err = sketch_remove(&mut tx, sketch.id, "bob").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let removed = sketch_remove(&mut tx, sketch.id, "alice").await.unwrap();
        assert_eq!(removed.id, sketch.id);

        let err = sketch_read(&mut tx, sketch.id, "alice").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let shared = sketch_read_shared(&mut tx, "bob").await.unwrap();
        assert_eq!(shared.len(), 0);
    }

    /// Test the landing page lists
    #[sqlx::test]
    async fn test_sketch_read_list(pool: PgPool) {
        post_test_sketch("Mine", "alice", &pool).await;
        let bobs = post_test_sketch("Bobs", "bob", &pool).await;
        post_test_sketch("Private", "bob", &pool).await;
        share(&pool, &bobs, "alice").await;

        let mut tx = pool.begin().await.unwrap();
        let list = sketch_read_list(&mut tx, "alice").await.unwrap();

        assert_eq!(list.my_sketches.len(), 1);
        assert_eq!(list.my_sketches[0].title, "Mine");
        assert_eq!(list.shared_sketches.len(), 1);
        assert_eq!(list.shared_sketches[0].title, "Bobs");
    }

    /// Test reading the sketch with its timelines and views
    #[sqlx::test]
    async fn test_sketch_read_with_children(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;
        let disk = post_test_timeline("plaso_disk", "alice", &pool).await;
        let memory = post_test_timeline("plaso_memory", "alice", &pool).await;

        {
            let mut tx = pool.begin().await.unwrap();
            sketch_timeline_add(&mut tx, sketch.id, &[disk.id, memory.id], "alice")
                .await
                .unwrap();
            tx.commit().await.unwrap();
        }

        let mut tx = pool.begin().await.unwrap();
        let children = sketch_read_with_children(&mut tx, sketch.id, "alice")
            .await
            .unwrap();

        assert_eq!(children.sketch.title, "Intrusion");
        assert_eq!(children.public, false);
        assert_eq!(children.timelines.len(), 2);
        assert_eq!(children.timelines[0].datastore_index, "plaso_disk");
        assert_eq!(children.timelines[1].datastore_index, "plaso_memory");
        assert_eq!(children.views.len(), 0);
    }

    /// Test the explore page joins the indices and loads the view
    #[sqlx::test]
    async fn test_sketch_explore(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;
        let disk = post_test_timeline("plaso_disk", "alice", &pool).await;
        let memory = post_test_timeline("plaso_memory", "alice", &pool).await;

        let view = {
            let mut tx = pool.begin().await.unwrap();
            sketch_timeline_add(&mut tx, sketch.id, &[disk.id, memory.id], "alice")
                .await
                .unwrap();
            let view_param = SavedViewParam {
                name: "Logins".to_string(),
                query: "event_id:4624".to_string(),
                filter: json!({"size": 100}),
            };
            let view = saved_view_add(&mut tx, sketch.id, &view_param, "alice")
                .await
                .unwrap();
            tx.commit().await.unwrap();
            view
        };

        let mut tx = pool.begin().await.unwrap();

        let explore = sketch_explore(&mut tx, sketch.id, 0, "alice").await.unwrap();
        assert_eq!(explore.indices, "plaso_disk,plaso_memory");
        assert_eq!(explore.view.is_none(), true);

        let explore = sketch_explore(&mut tx, sketch.id, view.id, "alice")
            .await
            .unwrap();
        assert_eq!(explore.view.unwrap().query, "event_id:4624");

        let err = sketch_explore(&mut tx, sketch.id, 42, "alice")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    /// Test the sharing setting
    #[sqlx::test]
    async fn test_sketch_share(pool: PgPool) {
        let sketch = post_test_sketch("Intrusion", "alice", &pool).await;

        let mut tx = pool.begin().await.unwrap();

        sketch_share(&mut tx, sketch.id, "public", "alice")
            .await
            .unwrap();
        assert_eq!(is_public(&mut tx, &sketch).await.unwrap(), true);

        sketch_share(&mut tx, sketch.id, "private", "alice")
            .await
            .unwrap();
        assert_eq!(is_public(&mut tx, &sketch).await.unwrap(), false);

        let err = sketch_share(&mut tx, sketch.id, "public", "bob")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
