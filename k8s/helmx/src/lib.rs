/// Contains the error type, constants and shared tooling.
pub mod common;
/// Contains tools which drive the helm binary.
pub mod helm;
/// Contains the adoption of existing resources into helm releases.
pub mod release;
