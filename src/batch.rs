//! Parallel decoding of independent images.
//!
//! Each image is decoded on its own with no shared state, so images are
//! spread across the rayon pool. Results come back in input order.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::E32Config;
use crate::error::{E32Error, Result};
use crate::formats::e32::{self, DecodeOptions, E32Decoder, E32Header};
use crate::io::{self, RawImage};

/// Decode every image in memory, one result per input in the same order
pub fn decode_all(images: &[RawImage], options: &DecodeOptions) -> Vec<e32::Result<E32Header>> {
    let decoder = E32Decoder::with_options(options.clone());
    debug!(count = images.len(), "decoding batch");
    images
        .par_iter()
        .map(|image| decoder.decode(image.as_bytes()))
        .collect()
}

/// Load and decode files, one result per path in the same order.
///
/// Failures are tagged with the path they came from.
pub fn decode_files<P>(paths: &[P], config: &E32Config) -> Vec<Result<E32Header>>
where
    P: AsRef<Path> + Sync,
{
    let decoder = E32Decoder::with_options(config.decode.clone());
    let results: Vec<Result<E32Header>> = paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            decode_file(&decoder, path, config)
                .map_err(|e| crate::log_error!(e.in_file(path), "decode_files"))
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(total = results.len(), failed, "batch decode finished");
    results
}

fn decode_file(decoder: &E32Decoder, path: &Path, config: &E32Config) -> Result<E32Header> {
    let image = io::load_image(path, &config.io)?;
    decoder.decode(image.as_bytes()).map_err(E32Error::from)
}
