//! Capability-based file access for geoingest documents.
//!
//! Paths are `camino` UTF-8 paths; every operation opens the containing
//! directory through `cap-std` with ambient authority and then works
//! relative to it.
#![forbid(unsafe_code)]

use std::io::{self, Read};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read the whole of a UTF-8 text file.
///
/// # Errors
/// Returns an error when the file cannot be opened or is not valid UTF-8.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let mut file = open_utf8_file(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Return whether a path names a regular file.
///
/// Directories and other non-file entries report `Ok(false)`.
///
/// # Errors
/// Returns [`io::ErrorKind::NotFound`] when the path or its parent does not
/// exist, and other I/O errors when the metadata cannot be read.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// The text is written to a sibling temporary file which is then renamed
/// over the destination, so readers never observe a partial document.
///
/// # Errors
/// Returns an error when a directory cannot be created or the write or
/// rename fails.
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let staging = format!(".{name}.partial");
    dir.write(&staging, contents)?;
    dir.rename(&staging, &dir, &name).inspect_err(|_| {
        let _cleanup = dir.remove_file(&staging);
    })
}

/// Ensure the parent directory for `path` exists.
///
/// # Errors
/// Returns an error when the directory tree cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Split a parent path into an ambient base directory and a relative suffix.
fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();
    let (base, relative) = match std_parent.components().next() {
        // Drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR_STR);
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR);
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, root)
    }

    #[rstest]
    fn written_documents_read_back(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let path = root.join("out/nested/harbour.geojson");
        write_utf8_file(&path, r#"{"type":"Point","coordinates":[151,-33]}"#)
            .expect("write document");
        assert_eq!(
            read_utf8_file(&path).expect("read document"),
            r#"{"type":"Point","coordinates":[151,-33]}"#
        );
        let staging = file_is_file(&root.join("out/nested/.harbour.geojson.partial"))
            .expect_err("staging file is renamed away");
        assert_eq!(staging.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn overwriting_replaces_contents(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let path = root.join("doc.json");
        write_utf8_file(&path, "first").expect("first write");
        write_utf8_file(&path, "second").expect("second write");
        assert_eq!(read_utf8_file(&path).expect("read back"), "second");
    }

    #[rstest]
    fn file_is_file_distinguishes_files_and_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("doc.json");
        write_utf8_file(&file, "{}").expect("write");
        assert!(file_is_file(&file).expect("file lookup"));
        assert!(!file_is_file(&root).expect("directory lookup"));
    }

    #[rstest]
    #[case("missing.json")]
    #[case("absent/doc.json")]
    fn missing_paths_are_not_found(workspace: (TempDir, Utf8PathBuf), #[case] relative: &str) {
        let (_guard, root) = workspace;
        let err = file_is_file(&root.join(relative)).expect_err("nothing on disk");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn reading_a_missing_file_fails(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let err = read_utf8_file(&root.join("missing.json")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn paths_without_file_names_are_rejected() {
        let err = file_is_file(Utf8Path::new("/")).expect_err("root has no file name");
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
