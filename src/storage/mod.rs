pub mod artifacts;
pub mod decode;
pub mod source;

pub use artifacts::{has_pickle_signature, ArtifactKind, ArtifactStore};
pub use decode::{decode_catalog, decode_similarity};
pub use source::{ArtifactSource, GoogleDriveSource};
