//! Set archive packaging (`.mse-set` zip)

use crate::render::set_file::{IMAGE_ENTRY, SET_ENTRY};
use crate::Result;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zip the set document and its card art into an in-memory archive
pub fn pack_set_archive(document: &str, image: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(SET_ENTRY, options)?;
    zip.write_all(document.as_bytes())?;
    zip.start_file(IMAGE_ENTRY, options)?;
    zip.write_all(image)?;

    Ok(zip.finish()?.into_inner())
}

/// Write a set archive to `path`, replacing any previous file
pub async fn write_set_archive(path: &Path, document: &str, image: &[u8]) -> Result<()> {
    let bytes = pack_set_archive(document, image)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
