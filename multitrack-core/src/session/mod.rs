pub mod controller;
pub mod playback;
pub mod recording;
