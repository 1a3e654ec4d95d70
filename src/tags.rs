//! Tag ids and value format codes used by the TIFF directory structure.

macro_rules! tags {
    {
        // Permit arbitrary meta items, which include documentation.
        $( #[$enum_attr:meta] )*
        $vis:vis enum $name:ident($ty:tt) {
            // Each of the `Name = Val,` permitting documentation.
            $($(#[$ident_attr:meta])* $tag:ident = $val:expr,)*
        }
    } => {
        $( #[$enum_attr] )*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
        #[non_exhaustive]
        #[repr($ty)]
        $vis enum $name {
            $($(#[$ident_attr])* $tag = $val,)*
        }

        impl $name {
            #[inline(always)]
            pub const fn from_u16(n: $ty) -> Option<Self> {
                match n {
                    $( $val => Some($name::$tag), )*
                    _ => None,
                }
            }

            #[inline(always)]
            pub const fn to_u16(&self) -> $ty {
                match *self {
                    $( $name::$tag => $val, )*
                }
            }
        }
    };
}

tags! {
/// The value format of an IFD entry (the 2-byte field following the tag id).
///
/// Codes outside 1..=12 have no representation; [`Format::from_u16`] returns
/// `None` for them and the directory walk treats that as a structural fault.
pub enum Format(u16) {
    /// 8-bit unsigned integer
    BYTE = 1,
    /// Fixed-length character string
    STRING = 2,
    /// 16-bit unsigned integer
    USHORT = 3,
    /// 32-bit unsigned integer
    ULONG = 4,
    /// Fraction stored as two 32-bit unsigned integers
    URATIONAL = 5,
    /// 8-bit signed integer
    SBYTE = 6,
    /// 8-bit byte that may contain anything, depending on the tag
    UNDEFINED = 7,
    /// 16-bit signed integer
    SSHORT = 8,
    /// 32-bit signed integer
    SLONG = 9,
    /// Fraction stored as two 32-bit signed integers
    SRATIONAL = 10,
    /// 32-bit IEEE floating point
    SINGLE = 11,
    /// 64-bit IEEE floating point
    DOUBLE = 12,
}
}

impl Format {
    /// Number of bytes one component of this format occupies.
    pub const fn byte_len(&self) -> i64 {
        match *self {
            Format::BYTE | Format::STRING | Format::SBYTE | Format::UNDEFINED => 1,
            Format::USHORT | Format::SSHORT => 2,
            Format::ULONG | Format::SLONG | Format::SINGLE => 4,
            Format::URATIONAL | Format::SRATIONAL | Format::DOUBLE => 8,
        }
    }
}

tags! {
/// Tag ids the decoder recognizes structurally.
///
/// Everything else passes through as an opaque id; interpreting individual
/// tag values is left to presentation code.
pub enum Tag(u16) {
    /// Camera manufacturer, read from IFD0 to drive makernote dispatch
    Make = 0x010F,
    /// Compression scheme of the thumbnail image
    ThumbnailCompression = 0x0103,
    /// Offset of the thumbnail byte stream, relative to the TIFF header
    ThumbnailOffset = 0x0201,
    /// Length of the thumbnail byte stream
    ThumbnailLength = 0x0202,
    /// Pointer to the Exif SubIFD
    ExifSubIfdPointer = 0x8769,
    /// Pointer to the GPS IFD
    GpsInfoPointer = 0x8825,
    /// Vendor-specific makernote data
    Makernote = 0x927C,
    /// Pointer to the Interoperability IFD
    InteropPointer = 0xA005,
}
}
