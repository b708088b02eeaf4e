use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use pulse_domain::SampleBuffer as MonoBuffer;
use serde::{Deserialize, Serialize};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::dsp::{FilterConfig, LowPassFilter};

/// A decoded track, already mixed down to a single channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    /// Channel count of the source before downmixing.
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Runs the low-pass filter over the mono samples in place.
    pub fn low_pass(&mut self, config: &FilterConfig) -> Result<()> {
        let mut filter = LowPassFilter::new(config, self.sample_rate)?;
        filter.apply(&mut self.samples);
        Ok(())
    }

    pub fn into_sample_buffer(self) -> Result<MonoBuffer> {
        let buffer = MonoBuffer::from_samples(self.sample_rate, self.samples)
            .context("decoded audio does not form a valid sample buffer")?;
        Ok(buffer)
    }
}

/// Averages each interleaved frame into one sample.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

pub struct AudioDecoder;

impl AudioDecoder {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<DecodedAudio> {
        let path_ref = path.as_ref();
        let file =
            File::open(path_ref).with_context(|| format!("open audio file {:?}", path_ref))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| anyhow::anyhow!("no default track found"))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| anyhow::anyhow!("track does not declare a sample rate"))?;
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);
        let mut samples = Vec::new();

        loop {
            match format.next_packet() {
                Ok(packet) => {
                    if packet.track_id() != track_id {
                        continue;
                    }
                    let buffer = match decoder.decode(&packet) {
                        Ok(buffer) => buffer,
                        Err(symphonia::core::errors::Error::DecodeError(err)) => {
                            warn!(%err, "skipping undecodable packet");
                            continue;
                        }
                        Err(err) => return Err(err.into()),
                    };
                    let spec = *buffer.spec();
                    channels = spec.channels.count() as u16;
                    let mut interleaved = SampleBuffer::<f32>::new(buffer.capacity() as u64, spec);
                    interleaved.copy_interleaved_ref(buffer);
                    samples.extend(downmix(interleaved.samples(), channels as usize));
                }
                Err(err) => {
                    use symphonia::core::errors::Error as SymphError;
                    match err {
                        SymphError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                            break;
                        }
                        _ => return Err(err.into()),
                    }
                }
            }
        }

        debug!(
            sample_rate,
            channels,
            frames = samples.len(),
            "decoded audio file"
        );
        Ok(DecodedAudio {
            sample_rate,
            channels,
            samples,
        })
    }
}
