use crate::{
    auth::{
        core::{basic_checker, SESSION_USERNAME},
        page::Signin,
    },
    index::Navbar,
    util::redirect,
};
use askama::Template;
use poem::{
    error::InternalServerError,
    handler,
    session::Session,
    web::{Form, Html},
    IntoResponse, Request, Response,
};
use poem_openapi::auth::Basic;
use serde::Deserialize;

/// Template for Signin form
#[derive(Template)]
#[template(path = "auth/component/signin_form.html")]
pub struct SigninForm {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninParams {
    username: String,
    password: String,
}

/// Check the creds posted by the sign in form
#[handler]
pub async fn signin_form(
    Form(params): Form<SigninParams>,
    session: &Session,
    req: &Request,
) -> Result<Response, poem::Error> {
    let basic = Basic {
        username: params.username,
        password: params.password,
    };

    // Do the creds match what we are expecting?
    match basic_checker(req, basic).await {
        Some(user) => {
            tracing::info!(username = %user.username, "signed in");
            session.set(SESSION_USERNAME, user.username);

            Ok(redirect("/"))
        }
        None => {
            let signin: String = Signin {
                navbar: Navbar { username: None },
                signin_form: SigninForm {
                    error: Some("User authentication failed".to_string()),
                },
            }
            .render()
            .map_err(InternalServerError)?;

            Ok(Html(signin).into_response())
        }
    }
}
