pub mod dsp;
pub mod io;

pub use dsp::{range_of, FilterConfig, LowPassFilter, PeakLevel};
pub use io::{downmix, AudioDecoder, DecodedAudio};
