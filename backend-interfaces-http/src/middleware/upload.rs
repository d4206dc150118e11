use anyhow::{anyhow, Result};
use axum::extract::Multipart;

/// Form field the upload page posts the file under.
pub const UPLOAD_FIELD: &str = "file";

pub struct CsvUpload {
    pub filename: String,
    pub text: String,
}

/// Pull the CSV file out of a multipart form: the `file` part must exist,
/// carry a `.csv` filename, and decode as UTF-8. Everything else on the
/// form is ignored.
pub async fn extract_csv_upload(mut multipart: Multipart) -> Result<CsvUpload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name().unwrap_or("") != UPLOAD_FIELD {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        if filename.is_empty() {
            return Err(anyhow!("no file selected"));
        }
        if !is_csv_filename(&filename) {
            return Err(anyhow!("only .csv files are allowed"));
        }
        let bytes = field.bytes().await?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| anyhow!("file is not valid UTF-8 text"))?;
        return Ok(CsvUpload { filename, text });
    }
    Err(anyhow!("missing '{}' form field", UPLOAD_FIELD))
}

pub fn is_csv_filename(filename: &str) -> bool {
    filename.ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_csv_suffix_only() {
        assert!(is_csv_filename("activity.csv"));
        assert!(!is_csv_filename("activity.txt"));
        assert!(!is_csv_filename("activity.csv.gz"));
        assert!(!is_csv_filename("activity.CSV"));
    }
}
