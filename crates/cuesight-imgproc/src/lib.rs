#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// utilities to draw on images.
pub mod draw;

/// edge detection module.
pub mod edges;

/// image enhancement module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// circle detection with the gradient Hough transform.
pub mod hough;

/// row iteration helpers shared by the pixel-wise operations.
pub mod rows;

/// utility functions for resizing images.
pub mod resize;
