use std::path::PathBuf;

use thiserror::Error;

use crate::tree::ElementId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse markup: {0}")]
    Markup(#[from] roxmltree::Error),
    #[error("Failed to parse path data: {0}")]
    PathData(String),
    #[error("Failed to parse style: {0}")]
    Style(String),
    #[error("Element {0:?} is not part of this tree")]
    UnknownElement(ElementId),
    #[error("Cannot insert element {child:?} under its own subtree rooted at {parent:?}")]
    CyclicInsertion { parent: ElementId, child: ElementId },
    #[error("Script error: {0}")]
    Script(String),
    #[error("Invalid image dimensions {width}x{height} for {len} pixels")]
    ImageSize { width: u32, height: u32, len: usize },
    #[error("Failed to decode SVG {0}")]
    Svg(String),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
