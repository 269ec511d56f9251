//! The host-side volume object the calibration logic reads from and writes to.

use std::sync::Arc;

use parking_lot::RwLock;
use voxcal_core::Volume;

/// A long-lived, host-owned holder of image data.
///
/// The calibration logic never reimplements the host's data model. It only
/// reads the current image, installs a replacement, and signals the change.
pub trait VolumeNode {
    /// Display name used in logs and for naming derived nodes.
    fn name(&self) -> &str;

    /// Current image data, if any has been set.
    fn get_image_data(&self) -> Option<Arc<Volume>>;

    /// Replace the image data.
    fn set_image_data(&mut self, volume: Arc<Volume>);

    /// Notify observers that the node changed.
    fn mark_modified(&mut self);
}

#[derive(Debug, Default)]
struct NodeState {
    image: Option<Arc<Volume>>,
    modified_count: u64,
}

/// In-memory [`VolumeNode`] shared between handles.
///
/// Clones refer to the same node, so one handle can observe modifications
/// made through another, including from other threads.
#[derive(Debug, Clone)]
pub struct SharedVolumeNode {
    name: Arc<str>,
    state: Arc<RwLock<NodeState>>,
}

impl SharedVolumeNode {
    /// Empty node with no image data.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(NodeState::default())),
        }
    }

    pub fn with_image(name: impl Into<Arc<str>>, volume: Volume) -> Self {
        let node = Self::new(name);
        node.state.write().image = Some(Arc::new(volume));
        node
    }

    /// Number of times [`VolumeNode::mark_modified`] has been called.
    pub fn modified_count(&self) -> u64 {
        self.state.read().modified_count
    }
}

impl VolumeNode for SharedVolumeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_image_data(&self) -> Option<Arc<Volume>> {
        self.state.read().image.clone()
    }

    fn set_image_data(&mut self, volume: Arc<Volume>) {
        self.state.write().image = Some(volume);
    }

    fn mark_modified(&mut self) {
        self.state.write().modified_count += 1;
    }
}
