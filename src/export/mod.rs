use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::model::SharedPhoto;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }

    /// Pick the format from the output file's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        [ExportFormat::Json, ExportFormat::Csv]
            .into_iter()
            .find(|format| format.extension() == ext)
    }
}

/// Photo data for export
#[derive(Debug, Serialize)]
pub struct ExportedPhoto {
    pub path: String,
    pub filename: String,
    pub captured_at: String,
    pub caption: String,
    pub tags: Vec<String>,
}

impl ExportedPhoto {
    fn from_shared(photo: &SharedPhoto) -> Self {
        let photo = photo.borrow();
        Self {
            path: photo.path().to_string(),
            filename: photo.file_name().unwrap_or_default().to_string(),
            captured_at: photo.captured_at().format("%Y-%m-%dT%H:%M:%S").to_string(),
            caption: photo.caption().to_string(),
            tags: photo.tags().iter().map(|t| t.label()).collect(),
        }
    }
}

/// Export photos to a file, in the order given. Returns how many were written.
pub fn export_photos(photos: &[SharedPhoto], output_path: &Path, format: ExportFormat) -> Result<usize> {
    let rows: Vec<ExportedPhoto> = photos.iter().map(ExportedPhoto::from_shared).collect();

    match format {
        ExportFormat::Json => export_json(&rows, output_path)?,
        ExportFormat::Csv => export_csv(&rows, output_path)?,
    }

    tracing::info!(
        path = %output_path.display(),
        format = format.name(),
        count = rows.len(),
        "Exported photos"
    );
    Ok(rows.len())
}

/// Like [`export_photos`], with the format taken from the file extension.
pub fn export_photos_to(photos: &[SharedPhoto], output_path: &Path) -> Result<usize> {
    let Some(format) = ExportFormat::from_path(output_path) else {
        bail!(
            "Cannot export to {}: use a .json or .csv file name",
            output_path.display()
        );
    };
    export_photos(photos, output_path, format)
}

fn export_json(photos: &[ExportedPhoto], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(photos)?;
    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(photos: &[ExportedPhoto], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    wtr.write_record(["path", "filename", "captured_at", "caption", "tags"])?;

    for photo in photos {
        wtr.write_record([
            &photo.path,
            &photo.filename,
            &photo.captured_at,
            &photo.caption,
            &photo.tags.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Photo, Tag};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn photos() -> Vec<SharedPhoto> {
        let at = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        let mut tagged = Photo::new("/img/leap.jpg", at);
        tagged.set_caption("leap day, finally");
        tagged.add_tag(Tag::new("Location", "Oslo"));
        tagged.add_tag(Tag::new("Person", "Alice"));
        vec![tagged.into_shared(), Photo::new("/img/plain.png", at).into_shared()]
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("out.html")), None);
        assert_eq!(ExportFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn test_export_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photos.json");

        assert_eq!(export_photos_to(&photos(), &path).unwrap(), 2);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["filename"], "leap.jpg");
        assert_eq!(value[0]["captured_at"], "2024-02-29T07:05:00");
        assert_eq!(value[0]["tags"][0], "Location: Oslo");
        assert_eq!(value[1]["caption"], "");
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photos.csv");

        export_photos(&photos(), &path, ExportFormat::Csv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "path,filename,captured_at,caption,tags");
        assert_eq!(
            lines[1],
            "/img/leap.jpg,leap.jpg,2024-02-29T07:05:00,\"leap day, finally\",Location: Oslo; Person: Alice"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempdir().unwrap();
        assert!(export_photos_to(&photos(), &dir.path().join("photos.txt")).is_err());
    }
}
