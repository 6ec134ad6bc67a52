//! EXIF time extraction for images

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use tracing::trace;

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,    // When the original image was taken
    Tag::DateTimeDigitized,   // When the image was digitized
    Tag::DateTime,            // File modification date/time
];

/// Extract the capture time from an already opened image
///
/// `path` is only used for diagnostics.
pub fn extract_exif_time<R: Read + Seek>(source: R, path: &Path) -> Result<NaiveDateTime> {
    read_exif_time(&mut BufReader::new(source), path)
}

fn read_exif_time<R: BufRead + Seek>(reader: &mut R, path: &Path) -> Result<NaiveDateTime> {
    let exif = Reader::new()
        .read_from_container(reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY)
            && let Some(datetime) = parse_exif_datetime(&field.display_value().to_string())
        {
            trace!(?path, ?tag, "Found EXIF date");
            return Ok(datetime);
        }
    }

    Err(Error::ExifRead {
        path: path.to_path_buf(),
        message: "No valid date tag found in EXIF data".to_string(),
    })
}

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    let formats = [
        "%Y:%m:%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];

    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::tests::jpeg_with_date;
    use chrono::{Datelike, Timelike};
    use std::io::Cursor;

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);

        let dt = parse_exif_datetime("\"2024:01:15 14:30:00\"").unwrap();
        assert_eq!(dt.year(), 2024);

        let dt = parse_exif_datetime("2024-01-15 14:30:00").unwrap();
        assert_eq!(dt.day(), 15);

        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("invalid").is_none());
    }

    #[test]
    fn test_extract_from_jpeg() {
        let bytes = jpeg_with_date("2019:03:04 08:00:01");
        let dt = extract_exif_time(Cursor::new(bytes), Path::new("a.jpg")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2019, 3, 4));
    }

    #[test]
    fn test_extract_unknown_container() {
        let err = extract_exif_time(Cursor::new(b"plain text".to_vec()), Path::new("a.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::ExifRead { .. }));
    }
}
