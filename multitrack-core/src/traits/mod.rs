pub mod audio_sink;
pub mod capture_source;
pub mod clock;
pub mod session_delegate;
