use snafu::Snafu;
use std::path::PathBuf;

/// For use with multiple fallible operations which may fail for different reasons, but are
/// defined withing the same scope and must return to the outer scope (calling scope) using
/// the try operator -- '?'.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Error for when a Helm command fails.
    #[snafu(display(
        "Failed to run Helm command,\ncommand: {},\nargs: {:?},\ncommand_error: {}",
        command,
        args,
        source
    ))]
    HelmCommand {
        source: std::io::Error,
        command: String,
        args: Vec<String>,
    },

    /// Error for when a Helm version command execution succeeds, but with an error.
    #[snafu(display(
        "`helm version` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmVersionCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm upgrade command execution succeeds, but with an error.
    #[snafu(display(
        "`helm upgrade` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmUpgradeCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for mandatory options for a HelmUpgrade are missing when building.
    #[snafu(display("Mandatory options 'release_name' and 'chart' for HelmUpgrade were not given"))]
    HelmUpgradeOptionsAbsent,

    /// Error for when a path handed to helm is not valid UTF-8.
    #[snafu(display("Path {} is not valid UTF-8", path.display()))]
    PathNotUtf8 { path: PathBuf },

    /// Error for use when converting Vec<> to String.
    #[snafu(display("Failed to convert Vec<u8> to UTF-8 formatted String: {}", source))]
    U8VectorToString { source: std::str::Utf8Error },

    /// Error for when a document in the input manifest is not valid YAML.
    #[snafu(display("YAML parse error on manifest document {}: {}", index, source))]
    YamlParseManifest {
        source: serde_yaml::Error,
        index: usize,
    },

    /// Error for when a release storage object could not be converted into YAML.
    #[snafu(display("Failed to serialize {} into YAML: {}", kind, source))]
    YamlSerialize {
        source: serde_yaml::Error,
        kind: String,
    },

    /// Error for when a release storage object could not be converted into JSON.
    #[snafu(display("Failed to serialize {} into JSON: {}", kind, source))]
    JsonSerialize {
        source: serde_json::Error,
        kind: String,
    },

    /// Error for when the release record could not be serialized for storage.
    #[snafu(display("Failed to encode release {}: {}", release_name, source))]
    ReleaseEncode {
        source: serde_json::Error,
        release_name: String,
    },

    /// Error for when the serialized release record could not be gzip compressed.
    #[snafu(display("Failed to compress release {}: {}", release_name, source))]
    ReleaseCompress {
        source: std::io::Error,
        release_name: String,
    },

    /// Error for when stored release data is not valid base64.
    #[snafu(display("Failed to base64 decode release data: {}", source))]
    ReleaseBase64Decode { source: base64::DecodeError },

    /// Error for when stored release data is not valid gzip.
    #[snafu(display("Failed to decompress release data: {}", source))]
    ReleaseDecompress { source: std::io::Error },

    /// Error for when decompressed release data is not a release record.
    #[snafu(display("Failed to decode release data: {}", source))]
    ReleaseDecode { source: serde_json::Error },

    /// Error when reading a file.
    #[snafu(display("Failed to read file {}: {}", filepath.display(), source))]
    ReadingFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error when reading from standard input.
    #[snafu(display("Failed to read from standard input: {}", source))]
    ReadingStdin { source: std::io::Error },
}

/// A wrapper type to remove repeated Result<T, Error> returns.
pub type Result<T, E = Error> = std::result::Result<T, E>;
