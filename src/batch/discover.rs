//! Recursive file discovery and destination path mapping.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// `true` if `path` has the extension `ext` (ASCII case-insensitive, no dot).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Every file under `root` whose extension matches `ext`, sorted by path.
///
/// Symbolic links to directories are not followed.
pub fn find_files(root: &Path, ext: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, ext, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, ext: &str, found: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Cannot read directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Cannot read directory '{}'", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("Cannot stat '{}'", path.display()))?;
        if file_type.is_dir() {
            walk(&path, ext, found)?;
        } else if has_extension(&path, ext) && path.is_file() {
            found.push(path);
        }
    }
    Ok(())
}

/// Mirror `file` (found under `input_root`) into `output_root`, swapping its
/// extension for `target_ext`.
pub fn destination_for(input_root: &Path, file: &Path, output_root: &Path, target_ext: &str) -> PathBuf {
    let relative = match file.strip_prefix(input_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => Path::new(file.file_name().unwrap_or_default()),
    };
    output_root.join(relative).with_extension(target_ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(has_extension(Path::new("a.msg"), "msg"));
        assert!(has_extension(Path::new("a.MSG"), "msg"));
        assert!(has_extension(Path::new("dir/a.Msg"), "msg"));
        assert!(!has_extension(Path::new("a.msgx"), "msg"));
        assert!(!has_extension(Path::new("msg"), "msg"));
    }

    #[test]
    fn test_find_files_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.msg"));
        touch(&root.join("a.MSG"));
        touch(&root.join("sub/deep/c.msg"));
        touch(&root.join("sub/notes.txt"));

        let found = find_files(root, "msg").unwrap();
        let relative: Vec<PathBuf> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            [
                PathBuf::from("a.MSG"),
                PathBuf::from("b.msg"),
                PathBuf::from("sub/deep/c.msg"),
            ]
        );
    }

    #[test]
    fn test_find_files_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files(dir.path(), "msg").unwrap().is_empty());
    }

    #[test]
    fn test_find_files_missing_root_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files(&dir.path().join("missing"), "msg").is_err());
    }

    #[test]
    fn test_destination_mirrors_relative_path() {
        let dest = destination_for(
            Path::new("/in"),
            Path::new("/in/2024/jan/mail.MSG"),
            Path::new("/out"),
            "eml",
        );
        assert_eq!(dest, PathBuf::from("/out/2024/jan/mail.eml"));
    }

    #[test]
    fn test_destination_keeps_inner_dots() {
        let dest = destination_for(
            Path::new("/in"),
            Path::new("/in/re. hello.msg"),
            Path::new("/out"),
            "eml",
        );
        assert_eq!(dest, PathBuf::from("/out/re. hello.eml"));
    }
}
