use crate::audio::backend::AudioFrame;
use crate::error::{Result, ScribeError};
use std::io::Cursor;

/// A bounded slice of captured audio, owned by the scheduler for the
/// duration of one transcription request. Discarded after merge or failure.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub session_id: String,
    /// Extraction sequence number (0-indexed)
    pub seq: u32,
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Start offset in milliseconds since capture started
    pub start_ms: u64,
    /// End offset in milliseconds since capture started
    pub end_ms: u64,
}

impl AudioChunk {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Encode the chunk as an in-memory WAV payload for submission
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| ScribeError::transcription(format!("WAV encoding failed: {}", e)))?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| ScribeError::transcription(format!("WAV encoding failed: {}", e)))?;
            }

            writer
                .finalize()
                .map_err(|e| ScribeError::transcription(format!("WAV encoding failed: {}", e)))?;
        }

        Ok(cursor.into_inner())
    }
}

/// Accumulates captured samples for one recording attempt and tracks the
/// chunk-extraction cursor. The full sample history is retained for the
/// final transcription pass at stop.
pub struct CaptureBuffer {
    session_id: String,
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    /// Sample index of the next unextracted sample
    cursor: usize,
    chunk_seq: u32,
    /// Minimum new samples before a non-flush extraction yields a chunk
    min_chunk_samples: usize,
}

impl CaptureBuffer {
    pub fn new(session_id: String, sample_rate: u32, channels: u16) -> Self {
        // One second of audio: short extractions are no-op work for the
        // transcription service
        let min_chunk_samples = (sample_rate as usize) * (channels as usize);

        Self {
            session_id,
            samples: Vec::new(),
            sample_rate,
            channels,
            cursor: 0,
            chunk_seq: 0,
            min_chunk_samples,
        }
    }

    pub fn push(&mut self, frame: &AudioFrame) {
        self.samples.extend_from_slice(&frame.samples);
    }

    /// Audio captured since the previous extraction.
    ///
    /// Returns `None` when no new audio exists, or — unless `flush` is set —
    /// when less than the minimum chunk length has accumulated.
    pub fn extract_chunk(&mut self, flush: bool) -> Option<AudioChunk> {
        let pending = self.samples.len() - self.cursor;
        if pending == 0 {
            return None;
        }
        if !flush && pending < self.min_chunk_samples {
            return None;
        }

        let start_ms = self.offset_ms(self.cursor);
        let samples = self.samples[self.cursor..].to_vec();
        self.cursor = self.samples.len();
        let end_ms = self.offset_ms(self.cursor);

        let chunk = AudioChunk {
            session_id: self.session_id.clone(),
            seq: self.chunk_seq,
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            start_ms,
            end_ms,
        };
        self.chunk_seq += 1;

        Some(chunk)
    }

    /// The entire captured audio of this recording attempt, for the final
    /// non-chunked transcription pass. Does not move the cursor.
    pub fn full_audio(&self) -> Option<AudioChunk> {
        if self.samples.is_empty() {
            return None;
        }

        Some(AudioChunk {
            session_id: self.session_id.clone(),
            seq: self.chunk_seq,
            samples: self.samples.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels,
            start_ms: 0,
            end_ms: self.offset_ms(self.samples.len()),
        })
    }

    /// Clear all captured audio and zero the extraction cursor
    pub fn reset(&mut self) {
        self.samples.clear();
        self.cursor = 0;
        self.chunk_seq = 0;
    }

    pub fn chunks_extracted(&self) -> u32 {
        self.chunk_seq
    }

    pub fn captured_ms(&self) -> u64 {
        self.offset_ms(self.samples.len())
    }

    fn offset_ms(&self, sample_index: usize) -> u64 {
        let per_second = self.sample_rate as u64 * self.channels as u64;
        if per_second == 0 {
            return 0;
        }
        sample_index as u64 * 1000 / per_second
    }
}
