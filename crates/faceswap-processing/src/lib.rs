//! Faceswap Processing Library
//!
//! Everything between an uploaded file and a produced artifact:
//! content-based media classification, per-request scratch workspaces,
//! image encoding and the face-swap adapter boundary.

pub mod classifier;
pub mod codec;
pub mod swapper;
pub mod synthetic;
pub mod workspace;

pub use classifier::{MediaClassifier, MediaDescriptor};
pub use codec::encode_image;
pub use swapper::{
    CommandLoader, CommandSwapper, FaceBox, FaceEmbedding, FaceSwapper, ModelHandle, ModelInfo,
    ModelLoader, SwapperError, VideoJob,
};
pub use synthetic::synthetic_face;
pub use workspace::{FileRole, ReleaseGuard, Workspace, WorkspaceError, WorkspaceManager};
