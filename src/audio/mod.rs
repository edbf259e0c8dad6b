pub mod assembler;
pub mod file;

pub use assembler::{AssembledAudio, AudioAssembler};
pub use file::AudioFile;
