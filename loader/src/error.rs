use thiserror::Error;

/// Failures raised while turning an IPPcode20 XML source into a
/// `RawProgram`. `Malformed` covers anything the XML parser itself
/// rejects (not well-formed markup); `Schema` covers every
/// IPPcode20-specific structural rule layered on top of well-formed
/// XML (wrong root attributes, non-contiguous `argN`, bad `order`,
/// and so on).
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("{0}")]
    Schema(String),
}

impl LoaderError {
    /// 31 for XML that isn't well-formed, 32 for any schema rule
    /// this crate enforces on top of that.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoaderError::Malformed(_) => 31,
            LoaderError::Schema(_) => 32,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
