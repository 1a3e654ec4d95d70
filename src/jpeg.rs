//! The JPEG segment side of metadata extraction.
//!
//! Segment discovery itself lives with the caller; this module only
//! defines the contract a segment-consuming reader fulfills, and the
//! Exif implementation of it.

use crate::decoder;
use crate::metadata::Metadata;

/// JPEG marker segment types that commonly carry metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JpegSegmentType {
    /// APP0, used for JFIF data
    App0,
    /// APP1, used for Exif and XMP data
    App1,
    /// APP2, used for ICC profiles
    App2,
    /// APPD, used for IPTC/Photoshop data
    AppD,
    /// APPE, used for Adobe data
    AppE,
    /// The comment segment
    Com,
}

/// A reader that can populate a [`Metadata`] store from the payload of
/// one JPEG segment.
pub trait JpegSegmentMetadataReader {
    /// The segment types this reader wants to be offered.
    fn segment_types(&self) -> &'static [JpegSegmentType];

    /// Whether this reader understands the given segment payload.
    fn can_process(&self, segment: &[u8], segment_type: JpegSegmentType) -> bool;

    /// Decode the segment payload, merging found values into `metadata`.
    fn extract(&self, segment: &[u8], metadata: &mut Metadata, segment_type: JpegSegmentType);
}

/// Decodes Exif data carried in APP1 segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifSegmentReader;

impl JpegSegmentMetadataReader for ExifSegmentReader {
    fn segment_types(&self) -> &'static [JpegSegmentType] {
        &[JpegSegmentType::App1]
    }

    fn can_process(&self, segment: &[u8], _segment_type: JpegSegmentType) -> bool {
        segment.len() > 3 && segment[..4].eq_ignore_ascii_case(b"EXIF")
    }

    fn extract(&self, segment: &[u8], metadata: &mut Metadata, _segment_type: JpegSegmentType) {
        decoder::extract_exif_segment(segment, metadata);
    }
}
