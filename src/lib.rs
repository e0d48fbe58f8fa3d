// thumbpick/src/lib.rs
mod cli;
pub mod config;
pub mod core;
pub mod sources;

pub use cli::{Cli, Commands};
pub use config::{SourceConfig, SourceKind, ThumbnailConfig};
pub use core::cost::{duration_cost, size_cost, CostOptions, SourceCost, SourceCosts};
pub use core::ctx::RequestCtx;
pub use core::source::{ByteDecoder, ByteReader, ReadDecoder, Sink, Source, Sources};
pub use core::{
    AspectRatioFit, GetResult, ImageId, Orientation, Result, Size, ThumbError, Thumbnail,
};

pub mod prelude {
    pub use crate::{
        AspectRatioFit, CostOptions, ImageId, RequestCtx, Size, Source, Sources, ThumbnailConfig,
    };
    pub use crate::sources::{Autotuned, Configured, CostSpec, Dedup, Filtered};
}

// Re-export commonly used types
pub use image::DynamicImage;
