//! Decoder for the headers of Symbian E32 executable images.
//!
//! ```no_run
//! use e32image::{decode, io::{load_image, IOLimits}};
//!
//! let image = load_image("sys/bin/app.exe", &IOLimits::default())?;
//! let header = decode(image.as_bytes())?;
//! println!("{} exports, {}", header.fixed.export_dir_count, header.build_generation);
//! # Ok::<(), e32image::E32Error>(())
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod logging;

pub use config::E32Config;
pub use error::{E32Error, Result};
pub use formats::e32::{
    decode, BuildGeneration, DecodeDiagnostic, DecodeError, DecodeOptions, E32Decoder, E32Header,
    FieldValue,
};
