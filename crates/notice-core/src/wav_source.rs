//! 16-bit PCM stream out of a WAV asset.
//!
//! Container parsing is delegated to `hound`; this module only normalizes
//! integer PCM to 16 bits, applies the volume and packs little-endian bytes
//! ready for an I2S peripheral.

use std::io::Read;

use hound::{SampleFormat, WavReader};

use crate::engine::Volume;

#[derive(Debug)]
pub enum WavError {
    /// The asset decodes, but not into something the output can play.
    Unsupported {
        sample_format: SampleFormat,
        bits_per_sample: u16,
        channels: u16,
    },
    Decode(hound::Error),
}

impl core::fmt::Display for WavError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WavError::Unsupported {
                sample_format,
                bits_per_sample,
                channels,
            } => write!(
                f,
                "Unsupported WAV: {:?} {} bit, {} channel(s)",
                sample_format, bits_per_sample, channels
            ),
            WavError::Decode(err) => write!(f, "WAV decode error: {}", err),
        }
    }
}

impl std::error::Error for WavError {}

impl From<hound::Error> for WavError {
    fn from(err: hound::Error) -> Self {
        WavError::Decode(err)
    }
}

/// Output format of a [`WavSource`]; samples are always 16-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub const fn bytes_per_frame(&self) -> usize {
        self.channels as usize * 2
    }
}

pub struct WavSource<R> {
    reader: WavReader<R>,
    format: PcmFormat,
    bits_per_sample: u16,
    samples_read: u32,
}

impl<R: Read> WavSource<R> {
    /// Parse the header and validate the sample layout.
    pub fn new(input: R) -> Result<Self, WavError> {
        let reader = WavReader::new(input)?;
        let spec = reader.spec();
        let supported = spec.sample_format == SampleFormat::Int
            && (8..=32).contains(&spec.bits_per_sample)
            && (1..=2).contains(&spec.channels);
        if !supported {
            return Err(WavError::Unsupported {
                sample_format: spec.sample_format,
                bits_per_sample: spec.bits_per_sample,
                channels: spec.channels,
            });
        }

        Ok(Self {
            format: PcmFormat {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
            },
            bits_per_sample: spec.bits_per_sample,
            samples_read: 0,
            reader,
        })
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Total length of the asset in frames.
    pub fn duration_frames(&self) -> u32 {
        self.reader.duration()
    }

    pub fn is_finished(&self) -> bool {
        self.samples_read >= self.reader.len()
    }

    /// Append up to `max_frames` frames to `out`; returns the frames written.
    ///
    /// Zero means the asset is exhausted.
    pub fn fill(
        &mut self,
        out: &mut Vec<u8>,
        max_frames: usize,
        volume: Volume,
    ) -> Result<usize, WavError> {
        let channels = self.format.channels as usize;
        let max_samples = max_frames * channels;
        let bits = self.bits_per_sample;
        out.reserve(max_samples * 2);

        let mut written = 0;
        let mut samples = self.reader.samples::<i32>();
        while written < max_samples {
            let Some(sample) = samples.next() else {
                break;
            };
            let sample = volume.apply(to_i16(sample?, bits));
            out.extend_from_slice(&sample.to_le_bytes());
            written += 1;
        }
        self.samples_read += written as u32;

        Ok(written / channels)
    }
}

fn to_i16(sample: i32, bits: u16) -> i16 {
    let normalized = if bits >= 16 {
        sample >> (bits - 16)
    } else {
        sample << (16 - bits)
    };
    normalized.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn spec(channels: u16, bits_per_sample: u16, sample_format: SampleFormat) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 22_050,
            bits_per_sample,
            sample_format,
        }
    }

    fn wav_bytes<S: hound::Sample + Copy>(spec: WavSpec, samples: &[S]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &sample in samples {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn decode(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn streams_stereo_frames_in_chunks() {
        let bytes = wav_bytes(
            spec(2, 16, SampleFormat::Int),
            &[1000i16, -1000, 2000, -2000, 3000, -3000],
        );
        let mut source = WavSource::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            source.format(),
            PcmFormat {
                sample_rate: 22_050,
                channels: 2
            }
        );
        assert_eq!(source.format().bytes_per_frame(), 4);
        assert_eq!(source.duration_frames(), 3);

        let mut out = Vec::new();
        assert_eq!(source.fill(&mut out, 2, Volume::MAX).unwrap(), 2);
        assert_eq!(decode(&out), vec![1000, -1000, 2000, -2000]);
        assert!(!source.is_finished());

        out.clear();
        assert_eq!(source.fill(&mut out, 2, Volume::MAX).unwrap(), 1);
        assert_eq!(decode(&out), vec![3000, -3000]);
        assert!(source.is_finished());

        out.clear();
        assert_eq!(source.fill(&mut out, 2, Volume::MAX).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn narrow_and_wide_samples_normalize_to_16_bit() {
        let eight = wav_bytes(spec(1, 8, SampleFormat::Int), &[64i8, -64]);
        let mut source = WavSource::new(Cursor::new(eight)).unwrap();
        let mut out = Vec::new();
        source.fill(&mut out, 8, Volume::MAX).unwrap();
        assert_eq!(decode(&out), vec![16_384, -16_384]);

        let twenty_four = wav_bytes(spec(1, 24, SampleFormat::Int), &[0x10_0000i32, -0x10_0000]);
        let mut source = WavSource::new(Cursor::new(twenty_four)).unwrap();
        let mut out = Vec::new();
        source.fill(&mut out, 8, Volume::MAX).unwrap();
        assert_eq!(decode(&out), vec![4096, -4096]);
    }

    #[test]
    fn volume_is_applied() {
        let bytes = wav_bytes(spec(1, 16, SampleFormat::Int), &[i16::MAX, i16::MIN]);
        let mut source = WavSource::new(Cursor::new(bytes)).unwrap();
        let mut out = Vec::new();
        source.fill(&mut out, 2, Volume::new(0).unwrap()).unwrap();
        assert_eq!(decode(&out), vec![0, 0]);
    }

    #[test]
    fn rejects_float_and_multichannel() {
        let float = wav_bytes(spec(1, 32, SampleFormat::Float), &[0.5f32]);
        assert!(matches!(
            WavSource::new(Cursor::new(float)),
            Err(WavError::Unsupported {
                sample_format: SampleFormat::Float,
                ..
            })
        ));

        let surround = wav_bytes(spec(3, 16, SampleFormat::Int), &[0i16, 0, 0]);
        assert!(matches!(
            WavSource::new(Cursor::new(surround)),
            Err(WavError::Unsupported { channels: 3, .. })
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = WavSource::new(Cursor::new(b"not a wav file".to_vec()));
        assert!(matches!(result, Err(WavError::Decode(_))));
    }
}
