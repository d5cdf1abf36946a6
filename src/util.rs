use poem::{
    http::{header, StatusCode},
    Response,
};
use poem_openapi::Tags;
use regex::Regex;
use validator::ValidationError;

/// How many rows a search returns per page
pub const PAGE_SIZE: u64 = 50;

/// Tags to group the API endpoints
#[derive(Tags)]
pub enum Tag {
    Auth,
    Sketch,
    Timeline,
    SavedView,
    Search,
}

/// Only allow names the datastore accepts as an index: lowercase letters, numbers, dots,
/// dashes, and underscores. First character needs to be a letter or number.
pub fn index_validater(index_name: &str) -> Result<(), ValidationError> {
    let index_regex = Regex::new("^[a-z0-9][a-z0-9_.-]*$");
    match index_regex {
        Ok(re) if re.is_match(index_name) => Ok(()),
        _ => Err(ValidationError::new("Failed Index Regex Check")),
    }
}

/// Escape the wildcard characters of a LIKE pattern so user input is matched literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Send the browser somewhere else
pub fn redirect(location: &str) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .finish()
}
