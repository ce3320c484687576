use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures reported by a [`crate::store::StoreClient`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no node at {0}")]
    NoNode(String),
    #[error("request for {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("cannot connect to {endpoints}: {source}")]
    Connect {
        endpoints: String,
        #[source]
        source: BoxError,
    },
    #[error("connecting to {endpoints} timed out after {timeout:?}")]
    ConnectTimeout { endpoints: String, timeout: Duration },
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("store unreachable")]
    Connection(#[source] StoreError),
    #[error("node {path} unavailable")]
    NodeUnavailable {
        path: String,
        #[source]
        source: StoreError,
    },
    #[error("node {0} not found")]
    NotFound(String),
    #[error("{0} does not name node content")]
    InvalidPath(String),
    #[error("{0} is read-only")]
    ReadOnly(String),
}

impl ProjectionError {
    pub fn errno(&self) -> i32 {
        match self {
            ProjectionError::Connection(_) => libc::EIO,
            ProjectionError::NodeUnavailable { .. } | ProjectionError::InvalidPath(_) => {
                libc::EINVAL
            }
            ProjectionError::NotFound(_) => libc::ENOENT,
            ProjectionError::ReadOnly(_) => libc::EACCES,
        }
    }
}

impl From<ProjectionError> for fuse3::Errno {
    fn from(value: ProjectionError) -> Self {
        fuse3::Errno::from(value.errno())
    }
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
