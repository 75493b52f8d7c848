//! Loading the reference pitch track.
//!
//! The track is a JSON array of `{timestamp, pitch}` objects, served over
//! HTTP by the analyzer backend or stored in a local file.

use std::path::{Path, PathBuf};

use pitchcoach_common::PitchSample;
use tracing::info;

use crate::error::ReferenceError;

/// Where to load the reference track from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    Url(String),
    File(PathBuf),
}

impl ReferenceSource {
    /// `http://` and `https://` sources are URLs, anything else is a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            ReferenceSource::Url(source.to_string())
        } else {
            ReferenceSource::File(PathBuf::from(source))
        }
    }
}

impl std::fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceSource::Url(url) => write!(f, "{}", url),
            ReferenceSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the reference track from `source`.
pub async fn load(source: &ReferenceSource) -> Result<Vec<PitchSample>, ReferenceError> {
    match source {
        ReferenceSource::Url(url) => fetch_reference(url).await,
        ReferenceSource::File(path) => load_reference_file(path),
    }
}

/// GET the reference track from the analyzer backend.
pub async fn fetch_reference(url: &str) -> Result<Vec<PitchSample>, ReferenceError> {
    let http_error = |source| ReferenceError::Http {
        url: url.to_string(),
        source,
    };

    let body = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(http_error)?
        .bytes()
        .await
        .map_err(http_error)?;

    let samples = parse_reference(&body)?;
    info!("Fetched reference track from {} ({} samples)", url, samples.len());
    Ok(samples)
}

/// Read the reference track from a JSON file.
pub fn load_reference_file(path: &Path) -> Result<Vec<PitchSample>, ReferenceError> {
    let bytes = std::fs::read(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = parse_reference(&bytes)?;
    info!(
        "Loaded reference track from {} ({} samples)",
        path.display(),
        samples.len()
    );
    Ok(samples)
}

/// Parse a JSON reference track. An empty array is an error.
pub fn parse_reference(bytes: &[u8]) -> Result<Vec<PitchSample>, ReferenceError> {
    let samples: Vec<PitchSample> = serde_json::from_slice(bytes)?;
    if samples.is_empty() {
        return Err(ReferenceError::Empty);
    }
    Ok(samples)
}

/// Voiced sample count and pitch range, for summaries.
pub fn summarize(samples: &[PitchSample]) -> (usize, Option<(f64, f64)>) {
    let voiced: Vec<f64> = samples.iter().filter_map(|s| s.pitch).collect();
    let range = voiced.iter().copied().fold(None, |range, p| match range {
        None => Some((p, p)),
        Some((lo, hi)) => Some((f64::min(lo, p), f64::max(hi, p))),
    });
    (voiced.len(), range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_source_parsing() {
        assert_eq!(
            ReferenceSource::parse("http://localhost:8000/reference-pitch"),
            ReferenceSource::Url("http://localhost:8000/reference-pitch".into())
        );
        assert_eq!(
            ReferenceSource::parse("songs/reference_pitch.json"),
            ReferenceSource::File(PathBuf::from("songs/reference_pitch.json"))
        );
    }

    #[test]
    fn test_parse_keeps_unvoiced_samples() {
        let samples =
            parse_reference(br#"[{"timestamp": 0.0, "pitch": 220.0}, {"timestamp": 0.01, "pitch": null}]"#)
                .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].pitch, None);
    }

    #[test]
    fn test_empty_track_rejected() {
        assert!(matches!(parse_reference(b"[]"), Err(ReferenceError::Empty)));
        assert!(matches!(parse_reference(b"{}"), Err(ReferenceError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"timestamp": 1.0, "pitch": 440.0}}]"#).unwrap();

        let samples = load_reference_file(file.path()).unwrap();
        assert_eq!(samples, vec![PitchSample::new(1.0, Some(440.0))]);

        let missing = load_reference_file(Path::new("/nonexistent/reference.json"));
        assert!(matches!(missing, Err(ReferenceError::Io { .. })));
    }

    #[test]
    fn test_summarize() {
        let samples = vec![
            PitchSample::new(0.0, Some(220.0)),
            PitchSample::new(0.1, None),
            PitchSample::new(0.2, Some(110.0)),
        ];
        assert_eq!(summarize(&samples), (2, Some((110.0, 220.0))));
        assert_eq!(summarize(&[]), (0, None));
    }
}
