mod core;
mod db;

pub use crate::acl::core::{
    acl_read, acl_remove_all, can_read, grant_read, is_public, make_private, make_public,
    require_owner, revoke_read, AccessControlEntry, AccessControlled, AclParam, ObjectType,
    PublicParam,
};
