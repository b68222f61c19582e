use std::collections::HashMap;

/// An opaque, ordered frame list for one sprite key.
///
/// The core only needs to know how many frames exist; the renderer resolves
/// `(key, index)` to actual pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frames {
    key: String,
    count: usize,
}

impl Frames {
    /// A frame list for `key` with `count` frames. At least one frame is kept.
    pub fn new(key: impl Into<String>, count: usize) -> Self {
        Self {
            key: key.into(),
            count: count.max(1),
        }
    }

    /// The sprite key these frames belong to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.count
    }
}

/// Supplies frame lists by sprite key.
pub trait ImageStore {
    /// The frames registered for `key`.
    fn frames(&self, key: &str) -> Frames;
}

/// A map-backed [`ImageStore`]. Unknown keys resolve to a single frame.
#[derive(Debug, Clone, Default)]
pub struct StaticImageStore {
    counts: HashMap<String, usize>,
}

impl StaticImageStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `count` frames for `key`.
    pub fn with_frames(mut self, key: impl Into<String>, count: usize) -> Self {
        self.counts.insert(key.into(), count);
        self
    }
}

impl ImageStore for StaticImageStore {
    fn frames(&self, key: &str) -> Frames {
        Frames::new(key, self.counts.get(key).copied().unwrap_or(1))
    }
}
