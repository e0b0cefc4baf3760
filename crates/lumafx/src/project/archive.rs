//! Project container: a zip holding `project.json` plus every referenced
//! image payload as `asset_N.dat`. Pure bytes-in/bytes-out; callers decide
//! where the archive lives.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{FxError, FxResult};

use super::{ProjectData, version_compatible};

/// Pack a snapshot and its assets. Asset references in the written
/// `project.json` are rewritten from material names to archive filenames.
pub fn write_archive(
    data: &ProjectData,
    assets: &HashMap<String, Vec<u8>>,
) -> FxResult<Vec<u8>> {
    let mut data = data.clone();
    let mut filenames: HashMap<String, String> = HashMap::new();
    let mut next_index = 0usize;
    let mut filename_for = |asset: &str, filenames: &mut HashMap<String, String>| {
        if let Some(existing) = filenames.get(asset) {
            return existing.clone();
        }
        let filename = format!("asset_{next_index}.dat");
        next_index += 1;
        filenames.insert(asset.to_string(), filename.clone());
        filename
    };

    for layer in &mut data.layers {
        if assets.contains_key(&layer.asset) {
            layer.asset = filename_for(&layer.asset, &mut filenames);
        } else {
            log::warn!("layer '{}' asset '{}' has no payload; left as-is", layer.name, layer.asset);
        }
    }
    for material in data.materials.values_mut() {
        if assets.contains_key(&material.asset) {
            material.asset = filename_for(&material.asset, &mut filenames);
        }
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("project.json", options)?;
    zip.write_all(serde_json::to_string_pretty(&data)?.as_bytes())?;
    for (asset, filename) in &filenames {
        zip.start_file(filename.as_str(), options)?;
        zip.write_all(&assets[asset])?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Unpack an archive into a snapshot plus its asset payloads, keyed by the
/// filenames the snapshot now references.
pub fn read_archive(bytes: &[u8]) -> FxResult<(ProjectData, HashMap<String, Vec<u8>>)> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let mut json = String::new();
    zip.by_name("project.json")
        .map_err(|_| FxError::project_format("missing project.json"))?
        .read_to_string(&mut json)?;
    let data: ProjectData = serde_json::from_str(&json)?;
    if !version_compatible(&data.version) {
        return Err(FxError::IncompatibleVersion(data.version));
    }

    let mut assets = HashMap::new();
    for index in 0..zip.len() {
        let mut file = zip.by_index(index)?;
        if file.name().ends_with(".json") {
            continue;
        }
        let mut payload = Vec::new();
        file.read_to_end(&mut payload)?;
        assets.insert(file.name().to_string(), payload);
    }
    Ok((data, assets))
}
