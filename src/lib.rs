//! Decoding of Exif/TIFF metadata
//!
//! Exif metadata rides inside still-image files as a TIFF stream: a
//! byte-order marker, a chain of tag directories (IFDs), and
//! pointer-referenced data regions. This crate walks that structure out
//! of a JPEG APP1 segment or a bare TIFF/RAW file and collects the raw
//! tag values, grouped by directory, into a [`Metadata`] store. Vendor
//! makernote blocks are descended into for the camera makes whose
//! framing is known.
//!
//! The input is untrusted by design: every read is bounds-checked,
//! pointer cycles are broken, and malformed structures degrade into
//! error strings on the affected directory rather than failures.
//!
//! ```
//! use exif_reader::{DirectoryKind, Metadata};
//!
//! let segment = [
//!     b"Exif\0\0".as_slice(),
//!     &[0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08],
//!     &[0x00, 0x01], // one entry
//!     &[0x01, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, 0x2A, 0x00, 0x00],
//!     &[0x00, 0x00, 0x00, 0x00], // no follower IFD
//! ]
//! .concat();
//!
//! let mut metadata = Metadata::new();
//! exif_reader::decoder::extract_exif_segment(&segment, &mut metadata);
//!
//! let ifd0 = metadata.get_directory(DirectoryKind::ExifIfd0).unwrap();
//! assert_eq!(ifd0.get_int(0x0100), Some(42));
//! ```
//!
//! # Related Links
//! * <https://web.archive.org/web/20131111073619/http://www.exif.org/Exif2-1.PDF> - The Exif specification
//! * <https://web.archive.org/web/20210108073850/https://www.adobe.io/open/standards/TIFF.html> - The TIFF specification

pub mod decoder;
mod error;
pub mod jpeg;
mod metadata;
mod reader;
pub mod tags;
mod value;

pub use self::error::{ExifError, ExifResult};
pub use self::metadata::{Directory, DirectoryKind, Metadata};
pub use self::reader::{ByteOrder, ByteReader};
pub use self::value::Value;
