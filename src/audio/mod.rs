//! Audio decoding helpers.

pub mod wav;
