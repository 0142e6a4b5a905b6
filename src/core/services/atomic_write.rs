use std::io::Write;
use std::path::Path;

/// Write `contents` to `dest` so that `dest` either keeps its old content
/// or holds the complete new content, never a partial file.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over `dest`. Missing parent directories are created.
pub fn write_atomic(dest: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".cryptsync-")
        .suffix(".part")
        .tempfile_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
