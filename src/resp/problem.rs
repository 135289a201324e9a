use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

use crate::error::StoreError;

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    #[schema(value_type = u16)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new(status: Status, type_uri: impl ToString, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: type_uri.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem::new(status, "about:blank", title)
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn instance_uri(&mut self, value: String) -> &mut Problem {
        self.instance_uri = Some(value);
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body;

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(instance) = self.instance_uri {
            body.insert(String::from("instance"), Value::from(instance));
        }

        let body_string = Value::Object(body).to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn parse_problem() -> Problem {
        Problem::new_untyped(
            Status::BadRequest,
            "There was a problem parsing part of the request.",
        )
    }

    #[inline]
    pub fn bad_body(detail: impl ToString) -> Problem {
        parse_problem().detail(detail).to_owned()
    }

    #[inline]
    pub fn bad_field(field: &str, detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid field value.")
            .insert_str("field", field)
            .detail(detail)
            .to_owned()
    }
}

fn mongodb_problem(e: &mongodb::error::Error) -> Problem {
    use mongodb::error::ErrorKind;

    fn store_problem() -> Problem {
        Problem::new_untyped(
            Status::InternalServerError,
            "MongoDB failed while processing request.",
        )
    }

    fn access_problem() -> Problem {
        Problem::new_untyped(
            Status::InternalServerError,
            "Server was unable to access MongoDB.",
        )
    }

    fn bad_db_request() -> Problem {
        Problem::new_untyped(
            Status::InternalServerError,
            "MongoDB was unable to process bad server request.",
        )
    }

    fn bson_problem() -> Problem {
        Problem::new_untyped(
            Status::InternalServerError,
            "There was a problem with handling MongoDB bson.",
        )
    }

    match e.kind.as_ref() {
        ErrorKind::InvalidArgument { .. } => bad_db_request(),
        ErrorKind::Authentication { .. } => access_problem(),
        ErrorKind::BsonDeserialization(_) => bson_problem(),
        ErrorKind::BsonSerialization(_) => bson_problem(),
        ErrorKind::BulkWrite(_) => bad_db_request(),
        ErrorKind::Command(_) => bad_db_request(),
        ErrorKind::DnsResolve { .. } => access_problem(),
        ErrorKind::ServerSelection { .. } => access_problem(),
        ErrorKind::InvalidTlsConfig { .. } => access_problem(),
        ErrorKind::IncompatibleServer { .. } => access_problem(),
        _ => store_problem(),
    }
}

impl From<StoreError> for Problem {
    fn from(e: StoreError) -> Self {
        tracing::error!("Data store failure: {}", e);

        let mut problem = match &e {
            StoreError::Database(inner) => mongodb_problem(inner),
            StoreError::Serialize(_) | StoreError::Deserialize(_) => Problem::new_untyped(
                Status::InternalServerError,
                "An error occurred while processing BSON data.",
            ),
            StoreError::Unavailable(_) => Problem::new_untyped(
                Status::InternalServerError,
                "Data store failed while processing request.",
            ),
        };
        problem.detail(e);
        problem
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(e: bson::ser::Error) -> Self {
        Problem::from(StoreError::from(e))
    }
}

impl From<bson::de::Error> for Problem {
    fn from(e: bson::de::Error) -> Self {
        Problem::from(StoreError::from(e))
    }
}
