#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut metadata = exif_reader::Metadata::new();
    exif_reader::decoder::extract_exif_segment(data, &mut metadata);

    let mut metadata = exif_reader::Metadata::new();
    exif_reader::decoder::extract_tiff(data, &mut metadata);
});
