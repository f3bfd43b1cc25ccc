use std::fs::create_dir_all;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use tracing::debug;
use tracing::error;

use crate::Result;
use crate::SystemError;

pub fn create_dir_if_not_exist(dir: &Path) -> Result<()> {
    if !dir.exists() {
        if let Err(e) = create_dir_all(dir) {
            error!("Failed to create directory {}: {:?}", dir.display(), e);
            return Err(SystemError::Io(e).into());
        }
        debug!("created directory: {}", dir.display());
    }
    Ok(())
}

/// Writes `value` as JSON indented by a single space, followed by a newline.
///
/// The file is truncated first, so every call is a full rewrite.
pub fn write_json_file<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_if_not_exist(parent)?;
    }

    let file = File::create(path).map_err(SystemError::Io)?;
    let mut writer = BufWriter::new(file);
    {
        let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b" "));
        value.serialize(&mut ser).map_err(SystemError::Serialization)?;
    }
    writer.write_all(b"\n").map_err(SystemError::Io)?;
    writer.flush().map_err(SystemError::Io)?;
    Ok(())
}
