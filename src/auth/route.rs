use crate::auth::{
    component::signin_form,
    page::{logout, profile, signin},
};
use poem::{get, Route};

/// Add the sign in, sign out, and profile pages
pub fn route(route: Route) -> Route {
    route
        .at("/signin", get(signin).post(signin_form))
        .at("/logout", get(logout))
        .at("/user/profile", get(profile))
}
