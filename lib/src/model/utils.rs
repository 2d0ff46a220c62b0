use std::path::Path;

use tracing::info;

use super::Dataset;
use crate::error::{Error, Result};

/// Parses one `x y` pair per line. Blank lines and `#` comments are skipped.
pub fn parse_dataset(content: &str) -> Result<Dataset> {
  let mut x = Vec::new();
  let mut y = Vec::new();
  for (i, line) in content.lines().enumerate() {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
      continue;
    }
    let parse_error = || Error::Parse {
      line: i + 1,
      content: line.to_string(),
    };
    let parts = trimmed
      .split_whitespace()
      .map(|val| val.parse::<f64>())
      .collect::<std::result::Result<Vec<_>, _>>()
      .map_err(|_| parse_error())?;
    match parts[..] {
      [xi, yi] => {
        x.push(xi);
        y.push(yi);
      }
      _ => return Err(parse_error()),
    }
  }
  Dataset::new(x, y)
}

pub fn read_dataset(path: &Path) -> Result<Dataset> {
  let content = std::fs::read_to_string(path)?;
  let dataset = parse_dataset(&content)?;
  info!("read {} samples from {}", dataset.len(), path.display());
  Ok(dataset)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_skips_comments_and_blank_lines() {
    let content = "# x y\n0 5\n\n5 8.5\n  10\t16  \n";
    let dataset = parse_dataset(content).unwrap();
    assert_eq!(dataset.x(), &[0.0, 5.0, 10.0]);
    assert_eq!(dataset.y(), &[5.0, 8.5, 16.0]);
  }

  #[test]
  fn test_parse_reports_line_number() {
    let content = "0 5\n1 2 3\n";
    match parse_dataset(content) {
      Err(Error::Parse { line, content }) => {
        assert_eq!(line, 2);
        assert_eq!(content, "1 2 3");
      }
      other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(matches!(
      parse_dataset("0 five\n"),
      Err(Error::Parse { line: 1, .. })
    ));
  }

  #[test]
  fn test_parse_empty_file_is_invalid_input() {
    assert!(matches!(
      parse_dataset("# nothing here\n"),
      Err(Error::InvalidInput { .. })
    ));
  }

  #[test]
  fn test_read_missing_file_is_io_error() {
    let path = Path::new("definitely/not/here.txt");
    assert!(matches!(read_dataset(path), Err(Error::Io(_))));
  }
}
