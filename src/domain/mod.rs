pub mod audio;
pub mod tts;
