use std::path::PathBuf;

use thiserror::Error;

/// Failure modes surfaced by the detection pipeline.
///
/// The numeric stages never fail on a decoded buffer, so reading the input
/// and writing the annotated copy are the only fallible operations. A failed
/// call produces no output file and no partial result.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The input path does not exist or its bytes cannot be decoded.
    #[error("cannot read image {}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The annotated overlay could not be encoded and written.
    #[error("cannot write annotated image {}", path.display())]
    AnnotationWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
