//! Decoding of Exif/TIFF metadata into a [`Metadata`] store.
//!
//! The walk is a recursive descent over TIFF directories: parse the
//! header, dispatch each 12-byte entry, follow the known sub-IFD pointer
//! tags, and chain to the optional follower IFD. Every pointer and length
//! comes from untrusted input, so every step is validated before it is
//! followed; a structural fault is recorded on the directory being built
//! and the walk continues wherever it safely can.

use std::collections::HashSet;

use log::trace;

use crate::metadata::{DirectoryKind, Metadata};
use crate::reader::{ByteOrder, ByteReader};
use crate::tags::{Format, Tag};
use crate::{Directory, ExifResult};

mod makernote;

/// Offset of the TIFF header inside a JPEG APP1 Exif segment, directly
/// after the `Exif\0\0` preamble.
pub const TIFF_HEADER_START_OFFSET: i64 = 6;

const EXIF_PREAMBLE: &[u8] = b"Exif\0\0";

const STANDARD_TIFF_MARKER: u16 = 0x002A;
const OLYMPUS_RAW_TIFF_MARKER: u16 = 0x4F52; // ORF files
const PANASONIC_RAW_TIFF_MARKER: u16 = 0x0055; // RW2 files

/// Decodes a JPEG APP1 Exif segment, merging found values into `metadata`.
///
/// The segment must start with the `Exif\0\0` preamble followed by a TIFF
/// stream. Faults are recorded as error strings on the affected
/// directories; this function itself never fails.
pub fn extract_exif_segment(segment: &[u8], metadata: &mut Metadata) {
    metadata.get_or_create_directory(DirectoryKind::ExifIfd0);

    if segment.len() <= 14 {
        metadata
            .get_or_create_directory(DirectoryKind::ExifIfd0)
            .add_error("Exif data segment must contain at least 14 bytes");
        return;
    }

    if !segment.starts_with(EXIF_PREAMBLE) {
        metadata
            .get_or_create_directory(DirectoryKind::ExifIfd0)
            .add_error("Exif data segment doesn't begin with 'Exif'");
        return;
    }

    let mut walker = Walker::new(ByteReader::new(segment));
    if walker
        .extract_tiff(metadata, TIFF_HEADER_START_OFFSET)
        .is_err()
    {
        metadata
            .get_or_create_directory(DirectoryKind::ExifIfd0)
            .add_error("Exif data segment ended prematurely");
    }
}

/// Decodes a bare TIFF/RAW stream whose header starts at offset 0.
pub fn extract_tiff(data: &[u8], metadata: &mut Metadata) {
    let mut walker = Walker::new(ByteReader::new(data));
    if walker.extract_tiff(metadata, 0).is_err() {
        metadata
            .get_or_create_directory(DirectoryKind::ExifIfd0)
            .add_error("Exif data segment ended prematurely");
    }
}

/// One TIFF walk over one byte region.
///
/// Holds the reader (whose byte-order flag the walk owns) and the set of
/// IFD offsets already entered. Each offset is entered at most once per
/// walk, which both breaks pointer cycles and bounds the total work by
/// the region length.
struct Walker<'a> {
    reader: ByteReader<'a>,
    seen: HashSet<i64>,
}

impl<'a> Walker<'a> {
    fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            seen: HashSet::new(),
        }
    }

    /// Parses the TIFF header at `tiff_header_offset` and walks the IFD
    /// chain hanging off it, IFD0 first.
    ///
    /// An `Err` from here means a read escaped the validated bounds; the
    /// entry points summarize it on the IFD0 directory.
    fn extract_tiff(&mut self, metadata: &mut Metadata, tiff_header_offset: i64) -> ExifResult<()> {
        metadata.get_or_create_directory(DirectoryKind::ExifIfd0);

        // this should be either "MM" or "II"
        let byte_order_identifier = self.reader.read_string(tiff_header_offset, 2)?;
        match byte_order_identifier.as_str() {
            "MM" => self.reader.set_byte_order(ByteOrder::BigEndian),
            "II" => self.reader.set_byte_order(ByteOrder::LittleEndian),
            _ => {
                metadata
                    .get_or_create_directory(DirectoryKind::ExifIfd0)
                    .add_error(format!(
                        "Unclear distinction between Motorola/Intel byte ordering: {}",
                        byte_order_identifier
                    ));
                return Ok(());
            }
        }

        let tiff_marker = self.reader.read_u16(tiff_header_offset + 2)?;
        if tiff_marker != STANDARD_TIFF_MARKER
            && tiff_marker != OLYMPUS_RAW_TIFF_MARKER
            && tiff_marker != PANASONIC_RAW_TIFF_MARKER
        {
            metadata
                .get_or_create_directory(DirectoryKind::ExifIfd0)
                .add_error(format!(
                    "Unexpected TIFF marker after byte order identifier: 0x{:x}",
                    tiff_marker
                ));
            return Ok(());
        }

        let mut first_ifd_offset =
            i64::from(self.reader.read_i32(tiff_header_offset + 4)?) + tiff_header_offset;
        if first_ifd_offset >= self.reader.len() as i64 - 1 {
            metadata
                .get_or_create_directory(DirectoryKind::ExifIfd0)
                .add_error("First Exif directory offset is beyond end of Exif data segment");
            // The first directory normally starts 14 bytes in; some broken
            // producers write a bogus pointer but still put it there.
            first_ifd_offset = 14;
        }

        trace!(
            "walking TIFF stream: {:?}, first IFD at {}",
            self.reader.byte_order(),
            first_ifd_offset
        );

        self.process_ifd(
            metadata,
            DirectoryKind::ExifIfd0,
            first_ifd_offset,
            tiff_header_offset,
        )?;

        self.store_thumbnail_bytes(metadata, tiff_header_offset);

        Ok(())
    }

    /// After the walk, the follower IFD may describe an embedded
    /// thumbnail; copy its raw bytes into the directory when the offset
    /// and length tags are both present and in bounds.
    fn store_thumbnail_bytes(&mut self, metadata: &mut Metadata, tiff_header_offset: i64) {
        let Some(thumbnail) = metadata.get_directory(DirectoryKind::ExifThumbnail) else {
            return;
        };
        if !thumbnail.contains_tag(Tag::ThumbnailCompression.to_u16()) {
            return;
        }
        let offset = thumbnail.get_int(Tag::ThumbnailOffset.to_u16());
        let length = thumbnail.get_int(Tag::ThumbnailLength.to_u16());
        let (Some(offset), Some(length)) = (offset, length) else {
            return;
        };

        match self
            .reader
            .read_bytes(tiff_header_offset + i64::from(offset), i64::from(length))
        {
            Ok(bytes) => {
                let bytes = bytes.to_vec();
                metadata
                    .get_or_create_directory(DirectoryKind::ExifThumbnail)
                    .set_thumbnail_data(bytes);
            }
            Err(err) => {
                metadata
                    .get_or_create_directory(DirectoryKind::ExifIfd0)
                    .add_error(format!("Invalid thumbnail data specification: {}", err));
            }
        }
    }

    /// Processes the IFD at `ifd_offset`, storing decoded values into the
    /// directory of the given kind.
    ///
    /// The IFD layout is a 2-byte tag count, `count` 12-byte entries (tag
    /// id, format code, component count, inline value or offset), and a
    /// 4-byte pointer to an optional follower IFD. All offsets inside
    /// entries are relative to `tiff_header_offset`, which differs from
    /// the region start inside some makernote framings.
    fn process_ifd(
        &mut self,
        metadata: &mut Metadata,
        kind: DirectoryKind,
        ifd_offset: i64,
        tiff_header_offset: i64,
    ) -> ExifResult<()> {
        metadata.get_or_create_directory(kind);

        // Revisiting an offset means a pointer cycle; stop silently.
        if !self.seen.insert(ifd_offset) {
            return Ok(());
        }

        let length = self.reader.len() as i64;
        if ifd_offset >= length || ifd_offset < 0 {
            metadata
                .get_or_create_directory(kind)
                .add_error("Ignored IFD marked to start outside data segment");
            return Ok(());
        }

        let tag_count = i64::from(self.reader.read_u16(ifd_offset)?);

        let dir_length = 2 + 12 * tag_count + 4;
        if dir_length + ifd_offset > length {
            metadata
                .get_or_create_directory(kind)
                .add_error("Illegally sized IFD");
            return Ok(());
        }

        for tag_number in 0..tag_count {
            let entry_offset = ifd_entry_offset(ifd_offset, tag_number);

            let tag_type = self.reader.read_u16(entry_offset)?;

            let format_code = self.reader.read_u16(entry_offset + 2)?;
            let Some(format) = Format::from_u16(format_code) else {
                // An invalid code means we are reading at a misaligned
                // index and would produce rubbish until we left the
                // region. Stop walking this directory.
                metadata
                    .get_or_create_directory(kind)
                    .add_error(format!("Invalid TIFF tag format code: {}", format_code));
                return Ok(());
            };

            let component_count = i64::from(self.reader.read_i32(entry_offset + 4)?);
            if component_count < 0 {
                metadata
                    .get_or_create_directory(kind)
                    .add_error("Negative TIFF tag component count");
                continue;
            }

            let byte_count = component_count * format.byte_len();
            let tag_value_offset = if byte_count > 4 {
                // The entry holds an offset instead of an inline value.
                // It is relative to the TIFF header, except in makernote
                // framings that re-base it; the caller encoded that choice
                // in `tiff_header_offset`.
                let offset_val = i64::from(self.reader.read_i32(entry_offset + 8)?);
                if offset_val + byte_count > length {
                    metadata
                        .get_or_create_directory(kind)
                        .add_error("Illegal TIFF tag pointer offset");
                    continue;
                }
                tiff_header_offset + offset_val
            } else {
                // 4 bytes or less and the value sits in the entry itself.
                entry_offset + 8
            };

            if tag_value_offset < 0 || tag_value_offset > length {
                metadata
                    .get_or_create_directory(kind)
                    .add_error("Illegal TIFF tag pointer offset");
                continue;
            }

            if byte_count < 0 || tag_value_offset + byte_count > length {
                metadata
                    .get_or_create_directory(kind)
                    .add_error(format!(
                        "Illegal number of bytes for TIFF tag data: {}",
                        byte_count
                    ));
                continue;
            }

            match Tag::from_u16(tag_type) {
                Some(Tag::ExifSubIfdPointer) => {
                    let sub_dir_offset =
                        tiff_header_offset + i64::from(self.reader.read_i32(tag_value_offset)?);
                    self.process_ifd(
                        metadata,
                        DirectoryKind::ExifSubIfd,
                        sub_dir_offset,
                        tiff_header_offset,
                    )?;
                }
                Some(Tag::InteropPointer) => {
                    let sub_dir_offset =
                        tiff_header_offset + i64::from(self.reader.read_i32(tag_value_offset)?);
                    self.process_ifd(
                        metadata,
                        DirectoryKind::ExifInterop,
                        sub_dir_offset,
                        tiff_header_offset,
                    )?;
                }
                Some(Tag::GpsInfoPointer) => {
                    let sub_dir_offset =
                        tiff_header_offset + i64::from(self.reader.read_i32(tag_value_offset)?);
                    self.process_ifd(
                        metadata,
                        DirectoryKind::Gps,
                        sub_dir_offset,
                        tiff_header_offset,
                    )?;
                }
                Some(Tag::Makernote) => {
                    // The tag value holds the vendor blob itself; the
                    // dispatcher works out the framing from its leading
                    // bytes and the camera make.
                    self.process_makernote(metadata, tag_value_offset, tiff_header_offset)?;
                }
                _ => {
                    // A read fault while decoding a value affects only
                    // this tag; the rest of the directory is intact.
                    let decoded = self.process_tag(
                        metadata.get_or_create_directory(kind),
                        tag_type,
                        tag_value_offset,
                        component_count,
                        format,
                    );
                    if let Err(err) = decoded {
                        metadata
                            .get_or_create_directory(kind)
                            .add_error(format!("Unable to read TIFF tag data: {}", err));
                        continue;
                    }
                }
            }
        }

        // At the end of each IFD is an optional link to the next one. In
        // Exif the only known follower is the thumbnail directory.
        let final_entry_offset = ifd_entry_offset(ifd_offset, tag_count);
        let next_ifd_offset = i64::from(self.reader.read_i32(final_entry_offset)?);
        if next_ifd_offset != 0 {
            let next_ifd_offset = next_ifd_offset + tiff_header_offset;
            if next_ifd_offset >= length {
                // Out-of-bounds follower pointer, likely a truncated file.
                return Ok(());
            }
            if next_ifd_offset < ifd_offset {
                // Backward link; following it would only revisit data.
                return Ok(());
            }
            self.process_ifd(
                metadata,
                DirectoryKind::ExifThumbnail,
                next_ifd_offset,
                tiff_header_offset,
            )?;
        }

        Ok(())
    }

    /// Decodes one tag value at `tag_value_offset` and stores it.
    ///
    /// The caller has verified that `component_count` components of
    /// `format` fit inside the region starting there, so the reads below
    /// only fail if that validation was wrong; an `Err` from here aborts
    /// this tag alone.
    fn process_tag(
        &mut self,
        directory: &mut Directory,
        tag_type: u16,
        tag_value_offset: i64,
        component_count: i64,
        format: Format,
    ) -> ExifResult<()> {
        let reader = &self.reader;
        match format {
            Format::UNDEFINED => {
                // This includes Exif user comments.
                let bytes = reader.read_bytes(tag_value_offset, component_count)?;
                directory.set_byte_array(tag_type, bytes.to_vec());
            }
            Format::STRING => {
                let string = reader
                    .read_null_terminated_string(tag_value_offset, component_count as usize)?;
                directory.set_string(tag_type, string);
            }
            Format::SRATIONAL => {
                if component_count == 1 {
                    directory.set_srational(
                        tag_type,
                        reader.read_i32(tag_value_offset)?,
                        reader.read_i32(tag_value_offset + 4)?,
                    );
                } else if component_count > 1 {
                    let mut rationals = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        rationals.push((
                            reader.read_i32(tag_value_offset + 8 * i)?,
                            reader.read_i32(tag_value_offset + 4 + 8 * i)?,
                        ));
                    }
                    directory.set_srational_array(tag_type, rationals);
                }
            }
            Format::URATIONAL => {
                if component_count == 1 {
                    directory.set_rational(
                        tag_type,
                        reader.read_u32(tag_value_offset)?,
                        reader.read_u32(tag_value_offset + 4)?,
                    );
                } else if component_count > 1 {
                    let mut rationals = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        rationals.push((
                            reader.read_u32(tag_value_offset + 8 * i)?,
                            reader.read_u32(tag_value_offset + 4 + 8 * i)?,
                        ));
                    }
                    directory.set_rational_array(tag_type, rationals);
                }
            }
            Format::SINGLE => {
                if component_count == 1 {
                    directory.set_float(tag_type, reader.read_f32(tag_value_offset)?);
                } else {
                    let mut floats = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        floats.push(reader.read_f32(tag_value_offset + 4 * i)?);
                    }
                    directory.set_float_array(tag_type, floats);
                }
            }
            Format::DOUBLE => {
                if component_count == 1 {
                    directory.set_double(tag_type, reader.read_f64(tag_value_offset)?);
                } else {
                    let mut doubles = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        doubles.push(reader.read_f64(tag_value_offset + 8 * i)?);
                    }
                    directory.set_double_array(tag_type, doubles);
                }
            }

            // All integral formats widen into the signed 32-bit slot, the
            // largest integer TIFF defines.
            Format::SBYTE => {
                if component_count == 1 {
                    directory.set_int(tag_type, i32::from(reader.read_i8(tag_value_offset)?));
                } else {
                    let mut ints = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        ints.push(i32::from(reader.read_i8(tag_value_offset + i)?));
                    }
                    directory.set_int_array(tag_type, ints);
                }
            }
            Format::BYTE => {
                if component_count == 1 {
                    directory.set_int(tag_type, i32::from(reader.read_u8(tag_value_offset)?));
                } else {
                    let mut ints = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        ints.push(i32::from(reader.read_u8(tag_value_offset + i)?));
                    }
                    directory.set_int_array(tag_type, ints);
                }
            }
            Format::USHORT => {
                if component_count == 1 {
                    directory.set_int(tag_type, i32::from(reader.read_u16(tag_value_offset)?));
                } else {
                    let mut ints = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        ints.push(i32::from(reader.read_u16(tag_value_offset + 2 * i)?));
                    }
                    directory.set_int_array(tag_type, ints);
                }
            }
            Format::SSHORT => {
                if component_count == 1 {
                    directory.set_int(tag_type, i32::from(reader.read_i16(tag_value_offset)?));
                } else {
                    let mut ints = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        ints.push(i32::from(reader.read_i16(tag_value_offset + 2 * i)?));
                    }
                    directory.set_int_array(tag_type, ints);
                }
            }
            Format::SLONG | Format::ULONG => {
                // 'long' here means 32 bit, not 64.
                if component_count == 1 {
                    directory.set_int(tag_type, reader.read_i32(tag_value_offset)?);
                } else {
                    let mut ints = Vec::with_capacity(component_count as usize);
                    for i in 0..component_count {
                        ints.push(reader.read_i32(tag_value_offset + 4 * i)?);
                    }
                    directory.set_int_array(tag_type, ints);
                }
            }
        }
        Ok(())
    }
}

/// Absolute offset of the entry with the given index within an IFD: 2
/// bytes of tag count, then 12 bytes per entry.
fn ifd_entry_offset(ifd_offset: i64, entry_number: i64) -> i64 {
    ifd_offset + 2 + 12 * entry_number
}
