use crate::error::ArchiveError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The single zip entry every save archive is expected to carry the document under.
const GAMESTATE_ENTRY: &str = "gamestate";

/// Open `path` as a zip archive, extract the `gamestate` entry, and decode it as UTF-8.
///
/// Does not attempt to detect or handle the binary "ironman" archive variant — callers are
/// expected to have filtered those out by filename before reaching this function (see
/// [`crate::monitor::SavePathMonitor`]).
pub fn read_gamestate(path: &Path) -> Result<String, ArchiveError> {
    let file = File::open(path).map_err(|err| ArchiveError::ArchiveBad(err.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| ArchiveError::ArchiveBad(err.to_string()))?;

    let mut entry = match archive.by_name(GAMESTATE_ENTRY) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Err(ArchiveError::EntryMissing),
        Err(err) => return Err(ArchiveError::ArchiveBad(err.to_string())),
    };

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|err| ArchiveError::ArchiveBad(err.to_string()))?;

    String::from_utf8(bytes).map_err(|err| ArchiveError::DecodeBad(err.utf8_error()))
}
