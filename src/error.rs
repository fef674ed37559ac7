use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use serde::{Serialize, Serializer};

use crate::campaign::{CampaignId, CampaignStatus};

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    ValidationFailed {
        missing_fields: Vec<&'static str>,
    },
    ProfileIncomplete {
        missing_fields: Vec<&'static str>,
    },
    InvalidInitialStatus {
        status: CampaignStatus,
    },

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    MessageNotGenerated,

    // 409
    DuplicateCampaignId {
        campaign_id: CampaignId,
    },
    InvalidTransition {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },
    GenerationInProgress,

    // 500
    ExistentialState(String),
    GenerationCancelled,
    GenerationFailed(String),
    InvalidSetting {
        key: &'static str,
        value: String,
    },
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::ValidationFailed { .. } => "E4001002",
            Error::ProfileIncomplete { .. } => "E4001003",
            Error::InvalidInitialStatus { .. } => "E4001004",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::MessageNotGenerated => "E4041002",
            Error::DuplicateCampaignId { .. } => "E4091001",
            Error::InvalidTransition { .. } => "E4091002",
            Error::GenerationInProgress => "E4091003",
            Error::ExistentialState(_) => "E5001000",
            Error::GenerationCancelled => "E5001001",
            Error::GenerationFailed(_) => "E5001002",
            Error::IoError(_) => "E5001003",
            Error::InvalidSetting { .. } => "E5001004",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::ValidationFailed { .. } => "The submitted campaign is missing required fields",
            Error::ProfileIncomplete { .. } => {
                "The profile needs a name and a job title before a message can be generated"
            }
            Error::InvalidInitialStatus { .. } => "A campaign cannot be created with this status",
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::MessageNotGenerated => "No message has been generated yet",
            Error::DuplicateCampaignId { .. } => "A campaign with the same id already exists",
            Error::InvalidTransition { .. } => {
                "The requested campaign cannot change status from its current status"
            }
            Error::GenerationInProgress => "A message is already being generated",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::GenerationCancelled => "The message generation was cancelled",
            Error::GenerationFailed(_) => "The message generation task failed",
            Error::IoError(_) => "An error occurred during an I/O operation",
            Error::InvalidSetting { .. } => "A configuration value could not be parsed",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::ProfileIncomplete { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidInitialStatus { .. } => StatusCode::BAD_REQUEST,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::MessageNotGenerated => StatusCode::NOT_FOUND,
            Error::DuplicateCampaignId { .. } => StatusCode::CONFLICT,
            Error::InvalidTransition { .. } => StatusCode::CONFLICT,
            Error::GenerationInProgress => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::GenerationCancelled => StatusCode::INTERNAL_SERVER_ERROR,
            Error::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidSetting { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
