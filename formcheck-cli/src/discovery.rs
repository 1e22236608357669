use anyhow::{bail, Result};
use formcheck_core::preprocessors::pdf::parse_page_dump;
use formcheck_core::DocumentFormat;
use std::path::{Path, PathBuf};

/// Expand the command-line inputs into the files to validate.
///
/// Files are taken as given, even with an unknown extension, so the caller
/// can report them as unsupported. Directories are listed one level deep and
/// contribute only files with a supported extension, sorted by path. A
/// listed `.json` file must hold a page dump, and `exclude` (the report
/// output file) is never picked up from a directory.
pub fn collect_inputs(inputs: &[PathBuf], exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let excluded = exclude.map(|path| path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(
                list_directory(input)?
                    .into_iter()
                    .filter(|path| !is_excluded(path, excluded.as_deref())),
            );
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("input not found: {}", input.display());
        }
    }
    Ok(files)
}

fn is_excluded(path: &Path, excluded: Option<&Path>) -> bool {
    match excluded {
        Some(excluded) => path.canonicalize().map_or(false, |p| p == excluded),
        None => false,
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

// Reports and other JSON left in a directory are not page dumps
fn holds_page_dump(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(json) => parse_page_dump(&json).is_ok(),
        Err(_) => false,
    }
}

fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || DocumentFormat::from_path(&path).is_none() {
            continue;
        }
        if is_json(&path) && !holds_page_dump(&path) {
            tracing::debug!(file = %path.display(), "skipping JSON that is not a page dump");
            continue;
        }
        found.push(path);
    }
    found.sort();
    tracing::debug!(dir = %dir.display(), count = found.len(), "listed directory");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("formcheck_discovery_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_directory_is_filtered_and_sorted() {
        let dir = scratch_dir("filter");
        for name in ["b.tex", "a.docx", "notes.txt", "D.PDF"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        fs::write(dir.join("c.json"), br#"{"pages": []}"#).unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("deep.tex"), b"").unwrap();

        let files = collect_inputs(&[dir.clone()], None).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["D.PDF", "a.docx", "b.tex", "c.json"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reports_in_directory_are_skipped() {
        let dir = scratch_dir("reports");
        let dump = r#"[{"width": 595.0, "height": 842.0, "blocks": []}]"#;
        fs::write(dir.join("dump.json"), dump).unwrap();
        let report = r#"[{"source": "thesis.tex", "format": "Latex"}]"#;
        fs::write(dir.join("old-report.json"), report).unwrap();
        fs::write(dir.join("report.json"), b"").unwrap();
        fs::write(dir.join("thesis.tex"), b"").unwrap();

        let files = collect_inputs(&[dir.clone()], Some(&dir.join("report.json"))).unwrap();
        assert_eq!(files, vec![dir.join("dump.json"), dir.join("thesis.tex")]);

        // The output file is skipped even when it already holds a page dump
        fs::write(dir.join("report.json"), dump).unwrap();
        let files = collect_inputs(&[dir.clone()], Some(&dir.join("report.json"))).unwrap();
        assert_eq!(files, vec![dir.join("dump.json"), dir.join("thesis.tex")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_explicit_file_kept_as_given() {
        let dir = scratch_dir("explicit");
        let file = dir.join("readme.txt");
        fs::write(&file, b"").unwrap();
        assert_eq!(collect_inputs(&[file.clone()], None).unwrap(), vec![file]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_input_is_error() {
        let missing = PathBuf::from("/nonexistent/formcheck/input.tex");
        assert!(collect_inputs(&[missing], None).is_err());
    }
}
