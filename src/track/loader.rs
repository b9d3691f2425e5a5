//! Track definition files: one `x y` pair per line.

use crate::error::{RideError, RideResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A control point as written in the track definition.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
}

impl RawPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Parses track text. Lines without two leading numbers are skipped.
pub fn parse_points(text: &str) -> Vec<RawPoint> {
    let mut skipped = 0usize;
    let points: Vec<RawPoint> = text
        .lines()
        .filter_map(|line| {
            let point = parse_line(line);
            if point.is_none() {
                skipped += 1;
            }
            point
        })
        .collect();

    if skipped > 0 {
        debug!("skipped {skipped} unparsable track lines");
    }
    points
}

fn parse_line(line: &str) -> Option<RawPoint> {
    let mut fields = line.split_whitespace();
    let x = fields.next()?.parse::<f32>().ok()?;
    let y = fields.next()?.parse::<f32>().ok()?;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(RawPoint::new(x, y))
}

/// Reads and parses a track file.
pub fn read_points<P: AsRef<Path>>(path: P) -> RideResult<Vec<RawPoint>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| RideError::io(path, e))?;
    Ok(parse_points(&text))
}

/// Like [`read_points`], but an unreadable file is logged and yields no points.
pub fn load_points<P: AsRef<Path>>(path: P) -> Vec<RawPoint> {
    match read_points(path) {
        Ok(points) => points,
        Err(err) => {
            warn!("failed to open track file: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_skips_bad_lines() {
        let text = "0 0\n1.5 2\nnot a point\n3\n\n4 -1 extra\n";
        let points = parse_points(text);

        assert_eq!(
            points,
            vec![
                RawPoint::new(0.0, 0.0),
                RawPoint::new(1.5, 2.0),
                RawPoint::new(4.0, -1.0),
            ]
        );
    }

    #[test]
    fn parse_accepts_tabs_and_padding() {
        let points = parse_points("  0.25\t0.75  \r\n");
        assert_eq!(points, vec![RawPoint::new(0.25, 0.75)]);
    }

    #[test]
    fn parse_rejects_non_finite() {
        assert!(parse_points("inf 1\n1 NaN\n").is_empty());
    }

    #[test]
    fn read_points_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0\n1 0\n1 1\n0 1").unwrap();

        let points = read_points(file.path()).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[2], RawPoint::new(1.0, 1.0));
    }

    #[test]
    fn read_missing_file_is_error() {
        let err = read_points("/definitely/not/here.track").unwrap_err();
        assert!(matches!(err, RideError::Io { .. }));
    }

    #[test]
    fn load_missing_file_is_empty() {
        assert!(load_points("/definitely/not/here.track").is_empty());
    }
}
