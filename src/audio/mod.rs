//! Audio decoding shared by the audio and video branches.

pub mod decode;
pub mod wav;
