pub mod backend;
pub mod buffer;

pub use backend::{
    AudioBackend, AudioFrame, CaptureConfig, CaptureProvider, FileBackend, FileCaptureProvider,
    NullCaptureProvider,
};
pub use buffer::{AudioChunk, CaptureBuffer};
