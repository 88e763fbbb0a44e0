use crate::db::error::DbError;
use axum::http::StatusCode;
use thiserror::Error;

pub type AppResult<T> = Result<T, DomainError>;

/// Every failure an inventory request can end in. All of them are recoverable by the client:
/// re-fetch the inventory and retry with the fresh version.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Actor may not view or edit this inventory
    #[error("forbidden")]
    Forbidden,

    /// No usable actor identity on the request
    #[error("unauthenticated")]
    Unauthenticated,

    /// Stale version presented
    #[error("conflict: expected version {expected}, found {actual}")]
    Conflict { expected: i64, actual: i64 },

    #[error("missing version")]
    MissingVersion,

    #[error("missing container")]
    MissingContainer,

    #[error("invalid container: {0}")]
    InvalidContainer(String),

    #[error("container {container} does not accept type {type_name}")]
    TypeMismatch { container: String, type_name: String },

    #[error("out of bounds")]
    OutOfBounds,

    #[error("overlap")]
    Overlap,

    #[error("no space")]
    NoSpace,

    #[error("rotation not allowed in this container")]
    RotationNotAllowed,

    #[error("invalid rotation")]
    InvalidRotation,

    /// Unequipping a bag that still holds items
    #[error("backpack not empty")]
    BackpackNotEmpty,

    /// Unequipping a belt whose fast slots still hold items
    #[error("belt not empty")]
    BeltNotEmpty,

    #[error("not stackable")]
    NotStackable,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("max stack exceeded")]
    MaxStackExceeded,

    #[error("template mismatch")]
    TemplateMismatch,

    #[error("invalid item: {0}")]
    InvalidItem(&'static str),

    #[error("invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("not usable")]
    NotUsable,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("invalid recipient")]
    InvalidRecipient,

    #[error("not in lobby")]
    NotInLobby,

    /// Lobby has no master to hand dropped items to
    #[error("missing master")]
    MissingMaster,

    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl DomainError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Forbidden => "forbidden",
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::Conflict { .. } => "conflict",
            DomainError::MissingVersion => "missing_version",
            DomainError::MissingContainer => "missing_container",
            DomainError::InvalidContainer(_) => "invalid_container",
            DomainError::TypeMismatch { .. } => "type_mismatch",
            DomainError::OutOfBounds => "out_of_bounds",
            DomainError::Overlap => "overlap",
            DomainError::NoSpace => "no_space",
            DomainError::RotationNotAllowed => "rotation_not_allowed",
            DomainError::InvalidRotation => "invalid_rotation",
            DomainError::BackpackNotEmpty => "backpack_not_empty",
            DomainError::BeltNotEmpty => "belt_not_empty",
            DomainError::NotStackable => "not_stackable",
            DomainError::InvalidAmount => "invalid_amount",
            DomainError::MaxStackExceeded => "max_stack_exceeded",
            DomainError::TemplateMismatch => "template_mismatch",
            DomainError::InvalidItem(_) => "invalid_item",
            DomainError::InvalidValue(_) => "invalid_value",
            DomainError::NotUsable => "not_usable",
            DomainError::NotFound(_) => "not_found",
            DomainError::InvalidRecipient => "invalid_recipient",
            DomainError::NotInLobby => "not_in_lobby",
            DomainError::MissingMaster => "missing_master",
            DomainError::Validation { .. } => "validation",
            DomainError::Db(DbError::VersionConflict { .. }) => "conflict",
            DomainError::Db(DbError::NotFound) => "not_found",
            DomainError::Db(_) => "db_error",
            DomainError::Infra(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DomainError::Conflict { .. } | DomainError::Db(DbError::VersionConflict { .. }) => StatusCode::CONFLICT,
            DomainError::MissingVersion
            | DomainError::MissingContainer
            | DomainError::InvalidValue(_)
            | DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) | DomainError::Db(DbError::NotFound) => StatusCode::NOT_FOUND,
            DomainError::Db(_) | DomainError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(toml::de::Error),

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: ConfigErrorKind,
    },

    #[error("invalid configuration: {0}")]
    Env(#[source] ConfigErrorKind),

    #[error("media storage: {0}")]
    Media(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::InstanceId;

    #[test]
    fn codes_and_statuses() {
        let err = DomainError::Conflict { expected: 2, actual: 3 };
        assert_eq!(err.code(), "conflict");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = DomainError::from(DbError::VersionConflict { id: InstanceId::from_u128(1) });
        assert_eq!(err.code(), "conflict");
        assert_eq!(err.status(), StatusCode::CONFLICT);

        assert_eq!(DomainError::Overlap.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(DomainError::MissingVersion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(DomainError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(DomainError::BackpackNotEmpty.code(), "backpack_not_empty");
    }

    #[test]
    fn storage_failures_surface_as_db_error() {
        let err = DomainError::from(DbError::Decode("bad row".into()));
        assert_eq!(err.code(), "db_error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
