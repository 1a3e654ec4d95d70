use std::error::Error;
use std::fmt;

/// Exif decoding error kinds.
///
/// Structural problems in the input (bad headers, bogus pointers, invalid
/// format codes) are not errors in this sense: they are recorded as strings
/// on the affected [`Directory`](crate::Directory) and the decode carries
/// on. The only condition that unwinds is a read outside the byte region.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExifError {
    /// A read was attempted outside the bounds of the byte region.
    ///
    /// Negative offsets are out of bounds by definition; so is a negative
    /// requested count.
    BufferBounds {
        /// Absolute offset the read started from.
        offset: i64,
        /// Number of bytes the read required.
        requested: i64,
        /// Total length of the byte region.
        length: usize,
    },
}

impl fmt::Display for ExifError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            ExifError::BufferBounds {
                offset,
                requested,
                length,
            } => write!(
                fmt,
                "attempt to read {} bytes at offset {} from a data segment of {} bytes",
                requested, offset, length
            ),
        }
    }
}

impl Error for ExifError {}

/// Result of a metadata decoding process
pub type ExifResult<T> = Result<T, ExifError>;
