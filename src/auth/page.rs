use crate::{
    auth::{component::SigninForm, core::session_user},
    index::Navbar,
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError, handler, session::Session, web::Html, IntoResponse, Request,
    Response,
};

/// Template for Sign In page
#[derive(Template)]
#[template(path = "auth/page/signin.html")]
pub struct Signin {
    pub navbar: Navbar,
    pub signin_form: SigninForm,
}

/// Sign in page
#[handler]
pub fn signin(session: &Session, req: &Request) -> Result<Response, poem::Error> {
    // Are we already signed in?
    if session_user(session, req).is_some() {
        return Ok(redirect("/"));
    }

    let signin: String = Signin {
        navbar: Navbar { username: None },
        signin_form: SigninForm { error: None },
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(signin).into_response())
}

/// Logout and purge some cookies
#[handler]
pub fn logout(session: &Session) -> Response {
    session.purge();

    redirect("/signin")
}

/// Template for the profile page
#[derive(Template)]
#[template(path = "auth/page/profile.html")]
struct Profile {
    navbar: Navbar,
    username: String,
}

/// Profile of the signed in user
#[handler]
pub fn profile(session: &Session, req: &Request) -> Result<Response, poem::Error> {
    let Some(username) = session_user(session, req) else {
        return Ok(redirect("/signin"));
    };

    let profile: String = Profile {
        navbar: Navbar {
            username: Some(username.clone()),
        },
        username,
    }
    .render()
    .map_err(InternalServerError)?;

    Ok(Html(profile).into_response())
}
