use crate::common::error::{ReadingFile, ReadingStdin, Result};
use snafu::ResultExt;
use std::{
    fs,
    io::{self, Read},
    path::Path,
};

/// Reads the whole of a manifest. The path '-' reads from standard input instead.
pub fn read_manifest<P>(path: P) -> Result<String>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context(ReadingStdin)?;
        return Ok(buf);
    }

    fs::read_to_string(path).context(ReadingFile {
        filepath: path.to_path_buf(),
    })
}
