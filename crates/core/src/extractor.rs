//! Reads plain-text content for keyword extraction.

use crate::config::is_text_extension;
use crate::error::ScanError;
use crate::models::FileRecord;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Loads `text` for every record with a plain-text extension. Records whose
/// content can't be read or isn't UTF-8 keep `text == None`; the failure is
/// returned so the caller can report it, but the record stays in the batch.
pub fn load_texts(records: &mut [FileRecord], max_bytes: usize) -> Vec<ScanError> {
    let mut errors = Vec::new();
    for record in records.iter_mut() {
        if !is_text_extension(&record.ext) {
            continue;
        }
        match read_text(&record.path, max_bytes) {
            Ok(text) => {
                debug!("read {} bytes of text from {:?}", text.len(), record.path);
                record.text = Some(text);
            }
            Err(e) => {
                warn!("skipping keywords for {:?}: {}", record.path, e);
                errors.push(ScanError::content(&record.path, e));
            }
        }
    }
    errors
}

pub fn read_text(path: &Path, max_bytes: usize) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut buf = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut buf)?;
    match String::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(e) => {
            let utf8 = e.utf8_error();
            let bytes = e.into_bytes();
            // A multi-byte character cut off by the read limit is not a decoding error.
            if utf8.error_len().is_none() && bytes.len() == max_bytes {
                let valid = utf8.valid_up_to();
                Ok(String::from_utf8_lossy(&bytes[..valid]).into_owned())
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::InvalidData, utf8))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn reads_text_files_and_skips_others() {
        let temp = tempfile::tempdir().unwrap();
        let txt = temp.path().join("a.txt");
        let bin = temp.path().join("b.txt");
        let pdf = temp.path().join("c.pdf");
        fs::write(&txt, "budget forecast").unwrap();
        fs::write(&bin, [0xff, 0xfe, 0x00, 0x41]).unwrap();
        fs::write(&pdf, "%PDF-1.4").unwrap();

        let mut records = vec![
            FileRecord::new(&txt, 15, Utc::now()),
            FileRecord::new(&bin, 4, Utc::now()),
            FileRecord::new(&pdf, 8, Utc::now()),
        ];
        let errors = load_texts(&mut records, 1024);

        assert_eq!(records[0].text.as_deref(), Some("budget forecast"));
        assert!(records[1].text.is_none());
        assert!(records[2].text.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, bin);
        assert!(!errors[0].excludes_file());
    }

    #[test]
    fn truncated_multibyte_char_is_dropped() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("u.txt");
        // "é" is two bytes; cut after the first.
        fs::write(&path, "abé").unwrap();
        assert_eq!(read_text(&path, 3).unwrap(), "ab");
        assert_eq!(read_text(&path, 64).unwrap(), "abé");
    }
}
