//! WAV container for captured PCM.

use crate::audio::capture::AudioConfig;

pub const WAV_MIME_TYPE: &str = "audio/wav";
pub const RECORDING_FILE_NAME: &str = "recording.wav";

const BITS_PER_SAMPLE: u16 = 16;
const HEADER_LEN: usize = 44;

/// One finished recording, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl AudioPayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Wrap raw S16_LE chunks, in capture order, into a single WAV file.
    pub fn wav_from_chunks(chunks: &[Vec<u8>], config: &AudioConfig) -> Self {
        Self::new(
            encode_wav(chunks, config.sample_rate, config.channels),
            WAV_MIME_TYPE,
            RECORDING_FILE_NAME,
        )
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// RIFF/WAVE, PCM, 16-bit little-endian. Sizes saturate at `u32::MAX`.
pub fn encode_wav(chunks: &[Vec<u8>], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len: usize = chunks.iter().map(Vec::len).sum();
    let data_size = u32::try_from(data_len).unwrap_or(u32::MAX);
    let block_align = channels.saturating_mul(BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));

    let mut out = Vec::with_capacity(HEADER_LEN + data_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&data_size.saturating_add(36).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for chunk in chunks {
        out.extend_from_slice(chunk);
    }
    out
}
