use std::fmt::Display;

/// Raw artwork bytes as received from the thumbnail endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes(Vec<u8>);

impl ImageBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Token identifying one accepted search; newer searches carry larger values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SearchGeneration(pub u64);

impl Display for SearchGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Identity of one displayed row
///
/// A thumbnail is only attached when all three parts still match the row
/// currently on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub generation: SearchGeneration,
    pub index: usize,
    pub track_id: i64,
}

impl Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.generation, self.index, self.track_id)
    }
}

/// Completion of one thumbnail fetch; `image` is `None` when the fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailDelivery {
    pub slot: SlotId,
    pub image: Option<ImageBytes>,
}
