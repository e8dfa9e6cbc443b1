//! Error taxonomy returned by use-case services.

use crate::model::ValidationError;
use crate::repo::error::{RepoError, RepoResult};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected; no mutation performed.
    Validation(ValidationError),
    /// Target record does not exist in storage.
    NotFound { entity: &'static str, id: Uuid },
    /// Write or read failed in the gateway.
    Persistence(RepoError),
}

impl ServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Persistence(err) => write!(f, "could not save changes: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

/// Converts a gateway result, logging failures under `event`.
pub(crate) fn persisted<T>(event: &'static str, result: RepoResult<T>) -> Result<T, ServiceError> {
    result.map_err(|err| {
        warn!("event={event} module=service status=error error={err}");
        ServiceError::from(err)
    })
}

/// Turns a missing lookup into `NotFound`.
pub(crate) fn found<T>(entity: &'static str, id: Uuid, value: Option<T>) -> Result<T, ServiceError> {
    value.ok_or(ServiceError::NotFound { entity, id })
}
