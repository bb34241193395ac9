use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mosaic operations
#[derive(Error, Diagnostic, Debug)]
pub enum MosaicError {
    #[error("IO error: {0}")]
    #[diagnostic(code(mosaic::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mosaic::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error on line {line}: {message} ({text:?})")]
    #[diagnostic(code(mosaic::parse))]
    Parse {
        /// 1-based line number
        line: usize,
        /// Raw text of the offending line
        text: String,
        message: String,
    },

    #[error("Unexpected end of input on line {line}: expected {expected}")]
    #[diagnostic(code(mosaic::parse::eof))]
    UnexpectedEnd { line: usize, expected: String },

    #[error("Document {source_id} not found")]
    #[diagnostic(code(mosaic::retrieval::not_found))]
    NotFound { source_id: String },

    #[error("Failed to retrieve {source_id}: {message}")]
    #[diagnostic(code(mosaic::retrieval))]
    Retrieval { source_id: String, message: String },

    #[error("Failed to allocate atlas level of size {size} ({bytes} bytes)")]
    #[diagnostic(
        code(mosaic::atlas::alloc),
        help("Lower `levels` in mosaic.yaml to cap the largest atlas level")
    )]
    Allocation { size: u32, bytes: usize },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(mosaic::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(mosaic::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl MosaicError {
    /// Errors scoped to a single source document.
    ///
    /// The scheduler drops the document and moves on when it sees one of these.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            MosaicError::Parse { .. }
                | MosaicError::UnexpectedEnd { .. }
                | MosaicError::NotFound { .. }
                | MosaicError::Retrieval { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MosaicError>;
