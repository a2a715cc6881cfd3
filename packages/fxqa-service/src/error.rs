pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<fxqa_providers::Error> for Error {
	fn from(err: fxqa_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<fxqa_storage::Error> for Error {
	fn from(err: fxqa_storage::Error) -> Self {
		match err {
			fxqa_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			fxqa_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}
