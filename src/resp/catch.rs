use rocket::http::Status;
use rocket::{Catcher, Request};

use crate::resp::problem::{problems, Problem};

/// Missing documents answer with an empty body.
#[catch(404)]
pub fn not_found() -> (Status, ()) {
    (Status::NotFound, ())
}

#[catch(400)]
pub fn bad_request(req: &Request<'_>) -> Problem {
    problems::parse_problem()
        .instance_uri(req.uri().to_string())
        .to_owned()
}

#[catch(422)]
pub fn unprocessable(req: &Request<'_>) -> Problem {
    Problem::new_untyped(
        Status::UnprocessableEntity,
        "Request was well-formed but contained invalid values.",
    )
    .instance_uri(req.uri().to_string())
    .to_owned()
}

#[catch(500)]
pub fn internal_error(req: &Request<'_>) -> Problem {
    tracing::error!("Unhandled failure while serving {}", req.uri());
    Problem::new_untyped(Status::InternalServerError, "Internal server error.")
        .instance_uri(req.uri().to_string())
        .to_owned()
}

pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, bad_request, unprocessable, internal_error]
}
