//! Binary format decoders

pub mod e32;
