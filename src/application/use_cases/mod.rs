//! Use case implementations.

mod fill_preview_use_case;

pub use fill_preview_use_case::{FillPreviewUseCase, PipelineStage};
