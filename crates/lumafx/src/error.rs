pub type FxResult<T> = Result<T, FxError>;

#[derive(thiserror::Error, Debug)]
pub enum FxError {
    #[error("unknown effect kind: {0}")]
    UnknownEffect(String),

    #[error("project format error: {0}")]
    ProjectFormat(String),

    #[error("incompatible project version: {0}")]
    IncompatibleVersion(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    pub fn project_format(msg: impl Into<String>) -> Self {
        Self::ProjectFormat(msg.into())
    }
}
