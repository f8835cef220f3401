//! Error types for the editor

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type EditorResult<T> = Result<T, EditorError>;
