mod image_resizer_port;
mod source_loader_port;

pub use image_resizer_port::ImageResizerPort;
pub use source_loader_port::SourceLoaderPort;
