pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<yojana_storage::Error> for Error {
	fn from(err: yojana_storage::Error) -> Self {
		let message = match &err {
			yojana_storage::Error::Read { source, .. } => format!("{err} {source}"),
			yojana_storage::Error::Parse { source, .. } => format!("{err} {source}"),
			yojana_storage::Error::Write { source, .. } => format!("{err} {source}"),
			yojana_storage::Error::Encode { source, .. } => format!("{err} {source}"),
		};

		Self::Storage { message }
	}
}
