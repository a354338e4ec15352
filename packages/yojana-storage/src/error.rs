use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read scheme table at {path:?}.")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse scheme table at {path:?}.")]
	Parse { path: PathBuf, source: serde_json::Error },
	#[error("Failed to write scheme table at {path:?}.")]
	Write { path: PathBuf, source: std::io::Error },
	#[error("Failed to encode scheme table for {path:?}.")]
	Encode { path: PathBuf, source: serde_json::Error },
}
