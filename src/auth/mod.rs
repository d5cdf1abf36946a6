mod api;
mod component;
mod core;
mod page;
mod route;

pub use crate::auth::{
    api::AuthApi,
    core::{make_jwt, session_user, Auth, TokenAuth, UserCred},
    route::route,
};
