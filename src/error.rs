use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Startup precondition violations. Raised once, before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("screen {axis} of {screen}px leaves no room for a {window}px window")]
    ScreenTooSmall {
        axis: &'static str,
        screen: u32,
        window: u32,
    },

    #[error("walk step of {step} sub-units must be smaller than the shortest edge span ({limit})")]
    StepTooLarge { step: i64, limit: i64 },

    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{name}` not found")]
    Missing { name: String },

    #[error("failed to read asset `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode image `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("asset `{name}` is not a TrueType/OpenType font")]
    Font { name: String },
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Anything that stops the mascot before or during startup.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("no monitor found")]
    NoMonitor,

    #[error("failed to create wgpu surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("the GPU cannot present to this window")]
    SurfaceUnsupported,

    #[error("no suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create wgpu device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to start feed poller: {0}")]
    Poller(#[source] io::Error),
}
