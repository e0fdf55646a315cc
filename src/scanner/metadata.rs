use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Where a capture time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Exif,
    Modified,
}

/// Capture time of an image: EXIF `DateTimeOriginal` when present,
/// otherwise the file's modification time in local time. Both are
/// truncated to whole seconds.
pub fn capture_time(path: &Path) -> io::Result<(NaiveDateTime, CaptureSource)> {
    if let Some(taken) = exif_date_taken(path) {
        return Ok((taken, CaptureSource::Exif));
    }

    let modified = std::fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    let naive = local.naive_local();
    Ok((
        naive.with_nanosecond(0).unwrap_or(naive),
        CaptureSource::Modified,
    ))
}

fn exif_date_taken(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;

    let field = exif
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .or_else(|| exif.get_field(exif::Tag::DateTime, exif::In::PRIMARY))?;

    match field.value {
        exif::Value::Ascii(ref v) => {
            let raw = v.first()?;
            let dt = exif::DateTime::from_ascii(raw).ok()?;
            NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?.and_hms_opt(
                dt.hour.into(),
                dt.minute.into(),
                dt.second.into(),
            )
        }
        _ => None,
    }
}
