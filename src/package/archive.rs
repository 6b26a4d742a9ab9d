//! Archive extraction.
//!
//! Inputs are `.mcaddon` / `.mcpack` / `.zip` (ZIP) or `.tar.gz` / `.tgz`
//! archives, or directories holding an already-extracted package. Every
//! archive is unpacked into its own temporary directory, which lives as long
//! as the returned [`PreparedPackage`].

use crate::error::{IoContext, MergeError, MergeResult};
use crate::types::SourcePackage;
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Extensions recognised as archives, longest first so `.tar.gz` wins over `.gz`.
const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".mcaddon", ".mcpack", ".zip", ".tgz"];

/// Supported archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

/// A source package ready for merging, with the extraction dir kept alive.
#[derive(Debug)]
pub struct PreparedPackage {
    pub package: SourcePackage,
    _extracted: Option<TempDir>,
}

/// Strip a recognised archive extension (case-insensitive).
fn strip_archive_extension(file_name: &str) -> Option<&str> {
    let lower = file_name.to_ascii_lowercase();
    ARCHIVE_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext) && lower.len() > ext.len())
        .map(|ext| &file_name[..file_name.len() - ext.len()])
}

/// True if `file_name` ends in a supported archive extension.
pub fn is_archive_name(file_name: &str) -> bool {
    strip_archive_extension(file_name).is_some()
}

/// Package name derived from an input path: the file name minus its archive extension.
pub fn package_name(input: &Path) -> String {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    strip_archive_extension(&file_name)
        .map(String::from)
        .unwrap_or(file_name)
}

/// Detect the container format from magic bytes, falling back to the extension.
pub fn detect_format(path: &Path) -> MergeResult<Option<ArchiveFormat>> {
    let mut magic = [0u8; 4];
    let mut reader = BufReader::new(File::open(path).at(path)?);
    let read = reader.read(&mut magic).at(path)?;

    if read >= 4 && magic == [0x50, 0x4b, 0x03, 0x04] {
        return Ok(Some(ArchiveFormat::Zip));
    }
    if read >= 2 && magic[..2] == [0x1f, 0x8b] {
        return Ok(Some(ArchiveFormat::TarGz));
    }

    let lower = path.to_string_lossy().to_ascii_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        Ok(Some(ArchiveFormat::TarGz))
    } else if is_archive_name(&lower) {
        Ok(Some(ArchiveFormat::Zip))
    } else {
        Ok(None)
    }
}

/// Unpack `archive` into `dest`. Blocking.
pub fn extract_archive(archive: &Path, dest: &Path) -> MergeResult<()> {
    let format = detect_format(archive)?
        .ok_or_else(|| MergeError::extract(archive, "unrecognised archive format"))?;
    let file = File::open(archive).at(archive)?;

    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(BufReader::new(file))
                .map_err(|e| MergeError::extract(archive, e))?;
            zip.extract(dest).map_err(|e| MergeError::extract(archive, e))?;
        }
        ArchiveFormat::TarGz => {
            let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
            tar.unpack(dest).map_err(|e| MergeError::extract(archive, e))?;
        }
    }
    Ok(())
}

/// List the inputs of an input directory: archives and package folders, sorted by name.
pub fn list_input_dir(dir: &Path) -> MergeResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() || is_archive_name(&name) {
            inputs.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-archive input");
        }
    }
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

/// Extract all inputs concurrently, returning packages in input order.
pub async fn prepare_packages(inputs: Vec<PathBuf>) -> MergeResult<Vec<PreparedPackage>> {
    let mut seen = HashSet::new();
    for input in &inputs {
        let name = package_name(input);
        if !seen.insert(name.clone()) {
            return Err(MergeError::DuplicatePackageName(name));
        }
    }

    let mut tasks = JoinSet::new();
    for (index, input) in inputs.into_iter().enumerate() {
        tasks.spawn_blocking(move || (index, prepare_one(input)));
    }

    let mut slots: Vec<Option<PreparedPackage>> = Vec::new();
    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(MergeError::internal)?;
        match result {
            Ok(prepared) => {
                if slots.len() <= index {
                    slots.resize_with(index + 1, || None);
                }
                slots[index] = Some(prepared);
            }
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    Ok(slots.into_iter().flatten().collect())
}

fn prepare_one(input: PathBuf) -> MergeResult<PreparedPackage> {
    let name = package_name(&input);

    if input.is_dir() {
        debug!(package = %name, path = %input.display(), "Using extracted package directory");
        return Ok(PreparedPackage {
            package: SourcePackage {
                name,
                root: input.clone(),
                origin: input,
            },
            _extracted: None,
        });
    }

    if !input.is_file() {
        return Err(MergeError::extract(&input, "input does not exist"));
    }

    let temp = tempfile::Builder::new()
        .prefix("pack-merger-")
        .tempdir()
        .map_err(|e| MergeError::extract(&input, e))?;
    extract_archive(&input, temp.path())?;
    info!(package = %name, archive = %input.display(), "Extracted package");

    Ok(PreparedPackage {
        package: SourcePackage {
            name,
            root: temp.path().to_path_buf(),
            origin: input,
        },
        _extracted: Some(temp),
    })
}
