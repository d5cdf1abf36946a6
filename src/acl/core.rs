use crate::{
    acl::db::{
        ace_drop, ace_drop_by_object, ace_insert, ace_public_drop, ace_public_exists,
        ace_public_insert, ace_read_exists, ace_select_by_object,
    },
    auth::UserCred,
};
use chrono::{DateTime, Utc};
use poem::{
    error::{BadRequest, Conflict, InternalServerError},
    http::StatusCode,
};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction, Type};
use std::fmt;
use validator::Validate;

/// Kinds of objects that carry access control entries
#[derive(Clone, Copy, Debug, Deserialize, Enum, PartialEq, Serialize, Type)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "object_type", rename_all = "lowercase")]
pub enum ObjectType {
    Sketch,
    Timeline,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Sketch => write!(f, "sketch"),
            ObjectType::Timeline => write!(f, "timeline"),
        }
    }
}

/// Permission record for one object. No username means everyone.
#[derive(Debug, FromRow, Object)]
pub struct AccessControlEntry {
    pub id: i32,
    pub object_type: ObjectType,
    pub object_id: i32,
    pub username: Option<String>,
    pub permission_read: bool,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
}

/// Who to share an object with
#[derive(Debug, Deserialize, Object, Serialize, Validate)]
pub struct AclParam {
    #[validate(length(min = 1))]
    pub username: String,
}

/// Toggle read access for everyone
#[derive(Debug, Deserialize, Object, Serialize)]
pub struct PublicParam {
    pub public: bool,
}

/// Anything that can be shared through access control entries
pub trait AccessControlled {
    /// Which kind of object this is
    fn object_type(&self) -> ObjectType;

    /// Primary key of the object
    fn object_id(&self) -> i32;

    /// Username of the object's owner
    fn owner(&self) -> &str;

    fn is_owner(&self, username: &str) -> bool {
        self.owner() == username
    }
}

/// Can the user read the object?
pub async fn can_read(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
    username: &str,
) -> Result<bool, poem::Error> {
    // Owners can always read their own objects
    if object.is_owner(username) {
        return Ok(true);
    }

    ace_read_exists(tx, &object.object_type(), object.object_id(), username)
        .await
        .map_err(InternalServerError)
}

/// Is the object readable by everyone?
pub async fn is_public(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
) -> Result<bool, poem::Error> {
    ace_public_exists(tx, &object.object_type(), object.object_id())
        .await
        .map_err(InternalServerError)
}

/// Only owners get to change who can see an object
pub fn require_owner(object: &impl AccessControlled, username: &str) -> Result<(), poem::Error> {
    match object.is_owner(username) {
        true => Ok(()),
        false => Err(poem::Error::from_string(
            format!("only the owner can modify this {}", object.object_type()),
            StatusCode::FORBIDDEN,
        )),
    }
}

/// Let everyone read the object
pub async fn make_public(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
    username: &str,
) -> Result<(), poem::Error> {
    require_owner(object, username)?;

    ace_public_insert(tx, &object.object_type(), object.object_id(), username)
        .await
        .map_err(InternalServerError)?;

    tracing::info!(
        object_type = %object.object_type(),
        object_id = object.object_id(),
        username,
        "made public",
    );

    Ok(())
}

/// Take away the read access granted to everyone
pub async fn make_private(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
    username: &str,
) -> Result<(), poem::Error> {
    require_owner(object, username)?;

    ace_public_drop(tx, &object.object_type(), object.object_id())
        .await
        .map_err(InternalServerError)?;

    tracing::info!(
        object_type = %object.object_type(),
        object_id = object.object_id(),
        username,
        "made private",
    );

    Ok(())
}

/// Share the object with one user
pub async fn grant_read(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
    acl_param: &AclParam,
    user_creds: &[UserCred],
    username: &str,
) -> Result<AccessControlEntry, poem::Error> {
    require_owner(object, username)?;

    // Make sure the payload we got is good (check with Validate package).
    acl_param.validate().map_err(BadRequest)?;

    // Only configured users can sign in to use the grant
    if !user_creds
        .iter()
        .any(|user_cred| user_cred.username == acl_param.username)
    {
        return Err(poem::Error::from_string(
            "user does not exist",
            StatusCode::NOT_FOUND,
        ));
    }

    if object.is_owner(&acl_param.username) {
        return Err(poem::Error::from_string(
            "owner already has access",
            StatusCode::BAD_REQUEST,
        ));
    }

    let ace = ace_insert(
        tx,
        &object.object_type(),
        object.object_id(),
        &acl_param.username,
        username,
    )
    .await
    .map_err(Conflict)?;

    tracing::info!(
        object_type = %object.object_type(),
        object_id = object.object_id(),
        grantee = %acl_param.username,
        "granted read access",
    );

    Ok(ace)
}

/// Stop sharing the object with one user
pub async fn revoke_read(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
    grantee: &str,
    username: &str,
) -> Result<AccessControlEntry, poem::Error> {
    require_owner(object, username)?;

    let delete = ace_drop(tx, &object.object_type(), object.object_id(), grantee).await;

    // What result did we get?
    match delete {
        Ok(ace) => Ok(ace),
        Err(sqlx::Error::RowNotFound) => Err(poem::Error::from_string(
            "access control entry does not exist",
            StatusCode::NOT_FOUND,
        )),
        Err(err) => Err(InternalServerError(err)),
    }
}

/// Read every entry for the object
pub async fn acl_read(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
) -> Result<Vec<AccessControlEntry>, poem::Error> {
    ace_select_by_object(tx, &object.object_type(), object.object_id())
        .await
        .map_err(InternalServerError)
}

/// Purge the entries of an object that is going away
pub async fn acl_remove_all(
    tx: &mut Transaction<'_, Postgres>,
    object: &impl AccessControlled,
) -> Result<u64, poem::Error> {
    ace_drop_by_object(tx, &object.object_type(), object.object_id())
        .await
        .map_err(InternalServerError)
}
