use std::fs;
use std::io;
use std::path::Path;

/// Checks if a file exists at the given path
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

/// Read every line of a text file. Accepts `\n` and `\r\n` line endings.
///
/// Bytes that are not valid UTF-8 are decoded as U+FFFD instead of failing,
/// so files in a legacy code page still load line by line.
pub fn read_lines<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content.lines().map(str::to_string).collect())
}

/// Read the lines of a store's backing file for the initial load.
///
/// A missing file is an empty store. Read failures are not surfaced to the
/// caller: the store starts empty and a warning is logged.
pub fn load_lines_lenient<P: AsRef<Path>>(path: P) -> Vec<String> {
    let path = path.as_ref();
    if !file_exists(path) {
        log::debug!("{} does not exist, starting empty", path.display());
        return Vec::new();
    }
    match read_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            log::warn!("Failed to read {}, starting empty: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Replace the whole content of a file with `text`.
pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> io::Result<()> {
    fs::write(path, text)
}
