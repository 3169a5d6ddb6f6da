use thiserror::Error;

use tripwire_engine::ColliderDesc;

/// Why a chain could not be built. Nothing is spawned when any of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("no segment prototype configured; set `segment_prototype` on the chain")]
    MissingSegmentPrototype,

    /// The prototype's collider cannot back a rigid body.
    #[error("segment prototype collider {0:?} has a non-positive dimension")]
    InvalidSegmentPrototype(ColliderDesc),

    #[error("segment_count must be at least 1")]
    NoSegments,

    /// The placement axis has zero length or is not finite.
    #[error("placement axis must be a finite, non-zero vector")]
    InvalidAxis,
}
