#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use cuesight_image as image;

#[doc(inline)]
pub use cuesight_imgproc as imgproc;

#[doc(inline)]
pub use cuesight_io as io;

#[doc(inline)]
pub use cuesight_calib as calib;

#[doc(inline)]
pub use cuesight_detect as detect;
