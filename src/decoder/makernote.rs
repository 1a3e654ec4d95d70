//! Vendor makernote framing dispatch.
//!
//! The makernote tag (`0x927C`) carries an opaque vendor blob that is
//! usually another IFD with its own framing: a signature header to skip,
//! an offset base that may be the TIFF header, the blob itself, or a
//! point inside the blob, and sometimes a byte order that differs from
//! the enclosing stream. Dispatch matches the leading bytes of the blob
//! and the camera `Make` tag, first match wins; unrecognized vendors are
//! skipped without comment because their framing, and therefore their
//! starting offset, is unknown.

use log::debug;

use super::Walker;
use crate::metadata::{Directory, DirectoryKind, Metadata};
use crate::reader::ByteOrder;
use crate::tags::Tag;
use crate::ExifResult;

/// Kodak makernote tag ids double as the field offsets within the block.
mod kodak {
    pub const TAG_KODAK_MODEL: u16 = 0;
    pub const TAG_QUALITY: u16 = 9;
    pub const TAG_BURST_MODE: u16 = 10;
    pub const TAG_IMAGE_WIDTH: u16 = 12;
    pub const TAG_IMAGE_HEIGHT: u16 = 14;
    pub const TAG_YEAR_CREATED: u16 = 16;
    pub const TAG_MONTH_DAY_CREATED: u16 = 18;
    pub const TAG_TIME_CREATED: u16 = 20;
    pub const TAG_BURST_MODE_2: u16 = 24;
    pub const TAG_SHUTTER_MODE: u16 = 27;
    pub const TAG_METERING_MODE: u16 = 28;
    pub const TAG_SEQUENCE_NUMBER: u16 = 29;
    pub const TAG_F_NUMBER: u16 = 30;
    pub const TAG_EXPOSURE_TIME: u16 = 32;
    pub const TAG_EXPOSURE_COMPENSATION: u16 = 36;
    pub const TAG_FOCUS_MODE: u16 = 56;
    pub const TAG_WHITE_BALANCE: u16 = 64;
    pub const TAG_FLASH_MODE: u16 = 92;
    pub const TAG_FLASH_FIRED: u16 = 93;
    pub const TAG_ISO_SETTING: u16 = 94;
    pub const TAG_ISO: u16 = 96;
    pub const TAG_TOTAL_ZOOM: u16 = 98;
    pub const TAG_DATE_TIME_STAMP: u16 = 100;
    pub const TAG_COLOR_MODE: u16 = 102;
    pub const TAG_DIGITAL_ZOOM: u16 = 104;
    pub const TAG_SHARPNESS: u16 = 107;
}

impl Walker<'_> {
    /// Dispatches the makernote blob whose value starts at `anchor`.
    ///
    /// The byte order in force on entry is restored on every exit path,
    /// so an override for one vendor subtree cannot leak into the
    /// enclosing walk, even when a read fault unwinds from inside it.
    pub(super) fn process_makernote(
        &mut self,
        metadata: &mut Metadata,
        anchor: i64,
        tiff_header_offset: i64,
    ) -> ExifResult<()> {
        // The camera make decides several framings that share signatures.
        let Some(ifd0) = metadata.get_directory(DirectoryKind::ExifIfd0) else {
            return Ok(());
        };
        let camera_make = ifd0.get_string(Tag::Make.to_u16()).map(String::from);

        let byte_order_before = self.reader.byte_order();
        let result = self.dispatch_makernote(metadata, anchor, tiff_header_offset, camera_make);
        self.reader.set_byte_order(byte_order_before);
        result
    }

    fn dispatch_makernote(
        &mut self,
        metadata: &mut Metadata,
        anchor: i64,
        tiff_header_offset: i64,
        camera_make: Option<String>,
    ) -> ExifResult<()> {
        let first_three = self.reader.read_string(anchor, 3)?;
        let first_four = self.reader.read_string(anchor, 4)?;
        let first_five = self.reader.read_string(anchor, 5)?;
        let first_six = self.reader.read_string(anchor, 6)?;
        let first_seven = self.reader.read_string(anchor, 7)?;
        let first_eight = self.reader.read_string(anchor, 8)?;
        let first_twelve = self.reader.read_string(anchor, 12)?;

        let make = camera_make.as_deref();
        let make_upper = make.map(str::to_uppercase);
        let make_starts_with =
            |prefix: &str| make_upper.as_deref().is_some_and(|m| m.starts_with(prefix));

        if first_five == "OLYMP" || first_five == "EPSON" || first_four == "AGFA" {
            // Epson and Agfa use the Olympus makernote layout.
            self.process_ifd(metadata, DirectoryKind::Olympus, anchor + 8, tiff_header_offset)?;
        } else if make.is_some_and(|m| m.trim().to_uppercase().starts_with("NIKON")) {
            if first_five == "Nikon" {
                // The byte after the signature separates the two Nikon
                // layouts: type 1 is a plain IFD 8 bytes in; type 3
                // embeds a complete TIFF header 10 bytes in and its
                // offsets are relative to that embedded header.
                match self.reader.read_u8(anchor + 6)? {
                    1 => self.process_ifd(
                        metadata,
                        DirectoryKind::NikonType1,
                        anchor + 8,
                        tiff_header_offset,
                    )?,
                    2 => self.process_ifd(
                        metadata,
                        DirectoryKind::NikonType2,
                        anchor + 18,
                        anchor + 10,
                    )?,
                    _ => {
                        metadata
                            .get_or_create_directory(DirectoryKind::ExifIfd0)
                            .add_error("Unsupported Nikon makernote data ignored.");
                    }
                }
            } else {
                // No signature; the IFD begins at the first makernote
                // byte. Seen on CoolPix 775, E990 and D1 models.
                self.process_ifd(metadata, DirectoryKind::NikonType2, anchor, tiff_header_offset)?;
            }
        } else if first_eight == "SONY CAM" || first_eight == "SONY DSC" {
            self.process_ifd(
                metadata,
                DirectoryKind::SonyType1,
                anchor + 12,
                tiff_header_offset,
            )?;
        } else if first_twelve == "SEMC MS\0\0\0\0\0" {
            // Sony Ericsson phones write this block big-endian no matter
            // what the enclosing stream says.
            self.reader.set_byte_order(ByteOrder::BigEndian);
            self.process_ifd(
                metadata,
                DirectoryKind::SonyType6,
                anchor + 20,
                tiff_header_offset,
            )?;
        } else if first_eight == "SIGMA\0\0\0" || first_eight == "FOVEON\0\0" {
            self.process_ifd(
                metadata,
                DirectoryKind::Sigma,
                anchor + 10,
                tiff_header_offset,
            )?;
        } else if first_three == "KDK" {
            // The seven-byte read can never equal the eight-character
            // signature, so every KDK block decodes little-endian.
            self.reader.set_byte_order(if first_seven == "KDK INFO" {
                ByteOrder::BigEndian
            } else {
                ByteOrder::LittleEndian
            });
            let directory = metadata.get_or_create_directory(DirectoryKind::Kodak);
            self.process_kodak_makernote(directory, anchor);
        } else if make.is_some_and(|m| m.eq_ignore_ascii_case("Canon")) {
            self.process_ifd(metadata, DirectoryKind::Canon, anchor, tiff_header_offset)?;
        } else if make_starts_with("CASIO") {
            if first_six == "QVC\0\0\0" {
                self.process_ifd(
                    metadata,
                    DirectoryKind::CasioType2,
                    anchor + 6,
                    tiff_header_offset,
                )?;
            } else {
                self.process_ifd(
                    metadata,
                    DirectoryKind::CasioType1,
                    anchor,
                    tiff_header_offset,
                )?;
            }
        } else if first_eight == "FUJIFILM" || make.is_some_and(|m| m.eq_ignore_ascii_case("Fujifilm"))
        {
            // Also written by some Leica cameras, such as the Digilux-4.3.
            // The block is always little-endian, and the four bytes after
            // the signature point at the IFD relative to the start of the
            // makernote rather than the TIFF header.
            self.reader.set_byte_order(ByteOrder::LittleEndian);
            let ifd_start = anchor + i64::from(self.reader.read_i32(anchor + 8)?);
            self.process_ifd(metadata, DirectoryKind::Fujifilm, ifd_start, anchor)?;
        } else if make_starts_with("MINOLTA") {
            // These models carry a valid Olympus-layout makernote that
            // commences immediately.
            self.process_ifd(metadata, DirectoryKind::Olympus, anchor, tiff_header_offset)?;
        } else if first_seven == "KYOCERA" {
            self.process_ifd(
                metadata,
                DirectoryKind::Kyocera,
                anchor + 22,
                tiff_header_offset,
            )?;
        } else if first_five == "LEICA" {
            self.reader.set_byte_order(ByteOrder::LittleEndian);
            if make == Some("Leica Camera AG") {
                self.process_ifd(metadata, DirectoryKind::Leica, anchor + 8, tiff_header_offset)?;
            } else if make == Some("LEICA") {
                // Some Leica cameras use Panasonic makernote tags.
                self.process_ifd(
                    metadata,
                    DirectoryKind::Panasonic,
                    anchor + 8,
                    tiff_header_offset,
                )?;
            }
        } else if first_twelve == "Panasonic\0\0\0" {
            // Non-standard IFD: no follower pointer at the end, offsets
            // relative to the TIFF header.
            self.process_ifd(
                metadata,
                DirectoryKind::Panasonic,
                anchor + 12,
                tiff_header_offset,
            )?;
        } else if first_four == "AOC\0" {
            // Casio type 2 tags; offsets relative to the makernote
            // itself. Observed on the Pentax *ist D.
            self.process_ifd(metadata, DirectoryKind::CasioType2, anchor + 6, anchor)?;
        } else if make_starts_with("PENTAX") || make_starts_with("ASAHI") {
            // Pentax tags with offsets relative to the makernote itself.
            // Observed on the Optio 330 and 430.
            self.process_ifd(metadata, DirectoryKind::Pentax, anchor, anchor)?;
        } else {
            // The starting offset of an unknown vendor's data cannot be
            // guessed, so nothing is stored.
            debug!(
                "unrecognized makernote preamble {:?} (make {:?}), skipping",
                first_eight, make
            );
        }

        Ok(())
    }

    /// The Kodak makernote is not an IFD; it is a record with fields at
    /// fixed offsets. A read fault aborts the whole block with one error,
    /// leaving any fields already stored in place.
    fn process_kodak_makernote(&mut self, directory: &mut Directory, anchor: i64) {
        let data_offset = anchor + 8;
        if let Err(err) = self.read_kodak_fields(directory, data_offset) {
            directory.add_error(format!("Error processing Kodak makernote data: {}", err));
        }
    }

    fn read_kodak_fields(&mut self, directory: &mut Directory, data: i64) -> ExifResult<()> {
        use self::kodak::*;

        let reader = &self.reader;
        directory.set_string(TAG_KODAK_MODEL, reader.read_string(data, 8)?);
        directory.set_int(TAG_QUALITY, i32::from(reader.read_u8(data + 9)?));
        directory.set_int(TAG_BURST_MODE, i32::from(reader.read_u8(data + 10)?));
        directory.set_int(TAG_IMAGE_WIDTH, i32::from(reader.read_u16(data + 12)?));
        directory.set_int(TAG_IMAGE_HEIGHT, i32::from(reader.read_u16(data + 14)?));
        directory.set_int(TAG_YEAR_CREATED, i32::from(reader.read_u16(data + 16)?));
        directory.set_byte_array(TAG_MONTH_DAY_CREATED, reader.read_bytes(data + 18, 2)?.to_vec());
        directory.set_byte_array(TAG_TIME_CREATED, reader.read_bytes(data + 20, 4)?.to_vec());
        directory.set_int(TAG_BURST_MODE_2, i32::from(reader.read_u16(data + 24)?));
        directory.set_int(TAG_SHUTTER_MODE, i32::from(reader.read_u8(data + 27)?));
        directory.set_int(TAG_METERING_MODE, i32::from(reader.read_u8(data + 28)?));
        directory.set_int(TAG_SEQUENCE_NUMBER, i32::from(reader.read_u8(data + 29)?));
        directory.set_int(TAG_F_NUMBER, i32::from(reader.read_u16(data + 30)?));
        directory.set_long(TAG_EXPOSURE_TIME, i64::from(reader.read_u32(data + 32)?));
        directory.set_int(
            TAG_EXPOSURE_COMPENSATION,
            i32::from(reader.read_i16(data + 36)?),
        );
        directory.set_int(TAG_FOCUS_MODE, i32::from(reader.read_u8(data + 56)?));
        directory.set_int(TAG_WHITE_BALANCE, i32::from(reader.read_u8(data + 64)?));
        directory.set_int(TAG_FLASH_MODE, i32::from(reader.read_u8(data + 92)?));
        directory.set_int(TAG_FLASH_FIRED, i32::from(reader.read_u8(data + 93)?));
        directory.set_int(TAG_ISO_SETTING, i32::from(reader.read_u16(data + 94)?));
        directory.set_int(TAG_ISO, i32::from(reader.read_u16(data + 96)?));
        directory.set_int(TAG_TOTAL_ZOOM, i32::from(reader.read_u16(data + 98)?));
        directory.set_int(TAG_DATE_TIME_STAMP, i32::from(reader.read_u16(data + 100)?));
        directory.set_int(TAG_COLOR_MODE, i32::from(reader.read_u16(data + 102)?));
        directory.set_int(TAG_DIGITAL_ZOOM, i32::from(reader.read_u16(data + 104)?));
        directory.set_int(TAG_SHARPNESS, i32::from(reader.read_i8(data + 107)?));
        Ok(())
    }
}
