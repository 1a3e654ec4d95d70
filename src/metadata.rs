//! The metadata store: directories of decoded tag values.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

use crate::value::Value;

/// The closed set of directory kinds a decode can produce.
///
/// At most one directory of each kind exists per [`Metadata`] store. The
/// kind identifies the tag schema for presentation purposes; the decoder
/// itself treats all kinds uniformly.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[non_exhaustive]
pub enum DirectoryKind {
    /// The primary image IFD
    ExifIfd0,
    /// The Exif SubIFD reached through the 0x8769 pointer
    ExifSubIfd,
    /// The Interoperability IFD reached through the 0xA005 pointer
    ExifInterop,
    /// The GPS IFD reached through the 0x8825 pointer
    Gps,
    /// The follower IFD describing the embedded thumbnail
    ExifThumbnail,
    Olympus,
    NikonType1,
    NikonType2,
    Canon,
    CasioType1,
    CasioType2,
    Fujifilm,
    Kodak,
    Kyocera,
    Leica,
    Panasonic,
    Pentax,
    Sigma,
    SonyType1,
    SonyType6,
}

impl DirectoryKind {
    /// Human-readable name of the directory.
    pub fn name(&self) -> &'static str {
        match *self {
            DirectoryKind::ExifIfd0 => "Exif IFD0",
            DirectoryKind::ExifSubIfd => "Exif SubIFD",
            DirectoryKind::ExifInterop => "Interoperability",
            DirectoryKind::Gps => "GPS",
            DirectoryKind::ExifThumbnail => "Exif Thumbnail",
            DirectoryKind::Olympus => "Olympus Makernote",
            DirectoryKind::NikonType1 => "Nikon Makernote",
            DirectoryKind::NikonType2 => "Nikon Makernote",
            DirectoryKind::Canon => "Canon Makernote",
            DirectoryKind::CasioType1 => "Casio Makernote",
            DirectoryKind::CasioType2 => "Casio Makernote",
            DirectoryKind::Fujifilm => "Fujifilm Makernote",
            DirectoryKind::Kodak => "Kodak Makernote",
            DirectoryKind::Kyocera => "Kyocera/Contax Makernote",
            DirectoryKind::Leica => "Leica Makernote",
            DirectoryKind::Panasonic => "Panasonic Makernote",
            DirectoryKind::Pentax => "Pentax Makernote",
            DirectoryKind::Sigma => "Sigma/Foveon Makernote",
            DirectoryKind::SonyType1 => "Sony Makernote",
            DirectoryKind::SonyType6 => "Sony Makernote",
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One directory of decoded tags.
///
/// Entries map a raw tag id to a [`Value`]. Error strings accumulate in
/// the order the decoder appended them; a failed decode never removes a
/// previously stored value.
#[derive(Debug, Clone)]
pub struct Directory {
    kind: DirectoryKind,
    entries: BTreeMap<u16, Value>,
    errors: Vec<String>,
    thumbnail_data: Option<Vec<u8>>,
}

impl Directory {
    fn new(kind: DirectoryKind) -> Self {
        Directory {
            kind,
            entries: BTreeMap::new(),
            errors: Vec::new(),
            thumbnail_data: None,
        }
    }

    /// Which directory of the store this is.
    pub fn kind(&self) -> DirectoryKind {
        self.kind
    }

    /// Store a value, replacing any previous value for the same tag.
    pub fn set(&mut self, tag: u16, value: Value) {
        self.entries.insert(tag, value);
    }

    pub fn set_int(&mut self, tag: u16, value: i32) {
        self.set(tag, Value::Signed(value));
    }

    pub fn set_int_array(&mut self, tag: u16, values: Vec<i32>) {
        self.set(
            tag,
            Value::List(values.into_iter().map(Value::Signed).collect()),
        );
    }

    pub fn set_long(&mut self, tag: u16, value: i64) {
        self.set(tag, Value::Long(value));
    }

    pub fn set_float(&mut self, tag: u16, value: f32) {
        self.set(tag, Value::Float(value));
    }

    pub fn set_float_array(&mut self, tag: u16, values: Vec<f32>) {
        self.set(
            tag,
            Value::List(values.into_iter().map(Value::Float).collect()),
        );
    }

    pub fn set_double(&mut self, tag: u16, value: f64) {
        self.set(tag, Value::Double(value));
    }

    pub fn set_double_array(&mut self, tag: u16, values: Vec<f64>) {
        self.set(
            tag,
            Value::List(values.into_iter().map(Value::Double).collect()),
        );
    }

    pub fn set_rational(&mut self, tag: u16, numerator: u32, denominator: u32) {
        self.set(tag, Value::Rational(numerator, denominator));
    }

    pub fn set_rational_array(&mut self, tag: u16, values: Vec<(u32, u32)>) {
        self.set(
            tag,
            Value::List(values.into_iter().map(|(n, d)| Value::Rational(n, d)).collect()),
        );
    }

    pub fn set_srational(&mut self, tag: u16, numerator: i32, denominator: i32) {
        self.set(tag, Value::SRational(numerator, denominator));
    }

    pub fn set_srational_array(&mut self, tag: u16, values: Vec<(i32, i32)>) {
        self.set(
            tag,
            Value::List(values.into_iter().map(|(n, d)| Value::SRational(n, d)).collect()),
        );
    }

    pub fn set_string(&mut self, tag: u16, value: String) {
        self.set(tag, Value::Ascii(value));
    }

    pub fn set_byte_array(&mut self, tag: u16, value: Vec<u8>) {
        self.set(tag, Value::Undefined(value));
    }

    /// Append a parse error without touching the stored entries.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Retrieve the value associated with a tag.
    pub fn get(&self, tag: u16) -> Option<&Value> {
        self.entries.get(&tag)
    }

    /// Retrieve a tag as a signed 32-bit integer, if present and integral.
    pub fn get_int(&self, tag: u16) -> Option<i32> {
        self.entries.get(&tag).and_then(Value::as_i32)
    }

    /// Retrieve a tag as string data, if present and a string.
    pub fn get_string(&self, tag: u16) -> Option<&str> {
        self.entries.get(&tag).and_then(Value::as_str)
    }

    /// Check if the directory contains a specified tag.
    pub fn contains_tag(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Number of stored tag values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all stored tags in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Value)> + '_ {
        self.entries.iter().map(|(&k, v)| (k, v))
    }

    /// Errors recorded while decoding this directory, oldest first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_thumbnail_data(&mut self, data: Vec<u8>) {
        self.thumbnail_data = Some(data);
    }

    /// Raw thumbnail bytes, when the follower IFD described one in bounds.
    pub fn thumbnail_data(&self) -> Option<&[u8]> {
        self.thumbnail_data.as_deref()
    }
}

/// The collection of directories produced by one decode.
///
/// Directories are kept in creation order and there is at most one per
/// kind; [`Metadata::get_or_create_directory`] is the only way one is
/// added.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    directories: IndexMap<DirectoryKind, Directory>,
}

impl Metadata {
    pub fn new() -> Self {
        Metadata::default()
    }

    /// Look up the directory of the given kind, creating it empty if this
    /// is the first request for that kind.
    pub fn get_or_create_directory(&mut self, kind: DirectoryKind) -> &mut Directory {
        self.directories
            .entry(kind)
            .or_insert_with(|| Directory::new(kind))
    }

    pub fn get_directory(&self, kind: DirectoryKind) -> Option<&Directory> {
        self.directories.get(&kind)
    }

    pub fn get_directory_mut(&mut self, kind: DirectoryKind) -> Option<&mut Directory> {
        self.directories.get_mut(&kind)
    }

    /// Number of directories created so far.
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Iterate over directories in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (DirectoryKind, &Directory)> + '_ {
        self.directories.iter().map(|(&k, v)| (k, v))
    }

    /// Errors across all directories, in directory creation order.
    pub fn errors(&self) -> impl Iterator<Item = &str> + '_ {
        self.directories
            .values()
            .flat_map(|d| d.errors().iter().map(String::as_str))
    }
}
