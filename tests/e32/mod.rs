//! End-to-end tests for E32 header decoding.

mod bitmap;
mod decode;
mod layout;
