//! Podcast audio assembly: decode the base64 PCM payload returned by the TTS
//! call, bracket it with optional theme music, and encode the combined stream
//! as MP3 or WAV.
//!
//! All segments are 16-bit signed PCM. Speech arrives at 24 kHz mono; every
//! segment in a composite must share that sample rate and channel count, and a
//! mismatch is a hard error rather than a silent resample.

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use mp3lame_encoder::{max_required_buffer_size, Bitrate, Builder, FlushNoGap, MonoPcm, Quality};
use thiserror::Error;

/// Sample rate of the TTS speech payload.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
/// The TTS payload is mono.
pub const SPEECH_CHANNELS: u16 = 1;

/// Samples fed to the MP3 encoder per call.
const MP3_BLOCK_SIZE: usize = 1152;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio data returned")]
    NoAudioData,
    #[error("PCM payload has an odd byte count ({0} bytes)")]
    OddByteCount(usize),
    #[error("invalid base64 audio payload: {0}")]
    Transport(#[from] base64::DecodeError),
    #[error("sample rate mismatch: expected {expected} Hz, got {got} Hz")]
    SampleRateMismatch { expected: u32, got: u32 },
    #[error("channel count mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: u16, got: u16 },
    #[error("unsupported WAV format: {0}")]
    UnsupportedWav(String),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("MP3 encoder error: {0}")]
    Encoder(String),
}

/// A run of 16-bit PCM samples with its framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioSegment {
    /// Decode a base64 transport payload of raw little-endian 16-bit PCM at
    /// the speech sample rate. An empty payload is a fatal error.
    pub fn from_base64(payload: &str) -> Result<Self, AudioError> {
        if payload.is_empty() {
            return Err(AudioError::NoAudioData);
        }
        let bytes = BASE64.decode(payload)?;
        Self::from_pcm_bytes(&bytes)
    }

    /// Reinterpret raw bytes as little-endian 16-bit samples.
    pub fn from_pcm_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        if bytes.is_empty() {
            return Err(AudioError::NoAudioData);
        }
        if bytes.len() % 2 != 0 {
            return Err(AudioError::OddByteCount(bytes.len()));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self {
            samples,
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        })
    }

    /// Load a theme-music segment from a 16-bit PCM WAV file.
    pub fn from_wav_file(path: &Path) -> Result<Self, AudioError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(AudioError::UnsupportedWav(format!(
                "{}: need 16-bit integer PCM, got {}-bit {:?}",
                path.display(),
                spec.bits_per_sample,
                spec.sample_format
            )));
        }
        let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
        if samples.is_empty() {
            return Err(AudioError::NoAudioData);
        }
        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Concatenate segments in order into one contiguous stream.
///
/// All segments must share the first segment's sample rate and channel count.
pub fn concat(segments: &[&AudioSegment]) -> Result<AudioSegment, AudioError> {
    let first = segments.first().ok_or(AudioError::NoAudioData)?;
    for segment in &segments[1..] {
        if segment.sample_rate != first.sample_rate {
            return Err(AudioError::SampleRateMismatch {
                expected: first.sample_rate,
                got: segment.sample_rate,
            });
        }
        if segment.channels != first.channels {
            return Err(AudioError::ChannelMismatch {
                expected: first.channels,
                got: segment.channels,
            });
        }
    }
    let total = segments.iter().map(|s| s.samples.len()).sum();
    let mut samples = Vec::with_capacity(total);
    for segment in segments {
        samples.extend_from_slice(&segment.samples);
    }
    Ok(AudioSegment {
        samples,
        sample_rate: first.sample_rate,
        channels: first.channels,
    })
}

/// Output container/codec for the assembled audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    /// Raw PCM in a WAV container.
    Wav,
    /// MP3 at the given bitrate.
    Mp3 { bitrate_kbps: u32 },
}

impl EncodeFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EncodeFormat::Wav => "wav",
            EncodeFormat::Mp3 { .. } => "mp3",
        }
    }
}

/// An encoded, playable artifact.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Assemble the final podcast stream (theme, speech, theme when theme music is
/// present; the theme segment is reused for intro and outro) and encode it.
pub fn assemble(
    speech: &AudioSegment,
    theme: Option<&AudioSegment>,
    format: EncodeFormat,
) -> Result<EncodedAudio, AudioError> {
    let composite = match theme {
        Some(theme) => concat(&[theme, speech, theme])?,
        None => concat(&[speech])?,
    };
    log::info!(
        "Assembled {} samples ({:.1}s) from {} segment(s)",
        composite.sample_count(),
        composite.duration_secs(),
        if theme.is_some() { 3 } else { 1 },
    );
    encode(&composite, format)
}

/// Encode one contiguous PCM stream into the requested container.
pub fn encode(segment: &AudioSegment, format: EncodeFormat) -> Result<EncodedAudio, AudioError> {
    match format {
        EncodeFormat::Wav => encode_wav(segment),
        EncodeFormat::Mp3 { bitrate_kbps } => encode_mp3(segment, bitrate_kbps),
    }
}

fn encode_wav(segment: &AudioSegment) -> Result<EncodedAudio, AudioError> {
    let mut cursor = Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: segment.channels,
        sample_rate: segment.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in &segment.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(EncodedAudio {
        bytes: cursor.into_inner(),
        mime: "audio/wav",
    })
}

fn lame_bitrate(kbps: u32) -> Result<Bitrate, AudioError> {
    match kbps {
        96 => Ok(Bitrate::Kbps96),
        112 => Ok(Bitrate::Kbps112),
        128 => Ok(Bitrate::Kbps128),
        160 => Ok(Bitrate::Kbps160),
        192 => Ok(Bitrate::Kbps192),
        224 => Ok(Bitrate::Kbps224),
        256 => Ok(Bitrate::Kbps256),
        320 => Ok(Bitrate::Kbps320),
        other => Err(AudioError::Encoder(format!("unsupported MP3 bitrate: {other} kbps"))),
    }
}

fn encode_mp3(segment: &AudioSegment, bitrate_kbps: u32) -> Result<EncodedAudio, AudioError> {
    if segment.channels != 1 {
        return Err(AudioError::ChannelMismatch {
            expected: 1,
            got: segment.channels,
        });
    }

    let mut builder =
        Builder::new().ok_or_else(|| AudioError::Encoder("failed to create encoder".into()))?;
    builder
        .set_num_channels(1)
        .map_err(|e| AudioError::Encoder(e.to_string()))?;
    builder
        .set_sample_rate(segment.sample_rate)
        .map_err(|e| AudioError::Encoder(e.to_string()))?;
    builder
        .set_brate(lame_bitrate(bitrate_kbps)?)
        .map_err(|e| AudioError::Encoder(e.to_string()))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| AudioError::Encoder(e.to_string()))?;
    let mut encoder = builder.build().map_err(|e| AudioError::Encoder(e.to_string()))?;

    let mut bytes: Vec<u8> = Vec::new();
    for block in segment.samples.chunks(MP3_BLOCK_SIZE) {
        bytes.reserve(max_required_buffer_size(block.len()));
        let written = encoder
            .encode(MonoPcm(block), bytes.spare_capacity_mut())
            .map_err(|e| AudioError::Encoder(e.to_string()))?;
        // SAFETY: the encoder initialized `written` bytes of spare capacity.
        unsafe { bytes.set_len(bytes.len() + written) };
    }
    bytes.reserve(max_required_buffer_size(MP3_BLOCK_SIZE));
    let written = encoder
        .flush::<FlushNoGap>(bytes.spare_capacity_mut())
        .map_err(|e| AudioError::Encoder(e.to_string()))?;
    // SAFETY: as above, for the flushed trailing frames.
    unsafe { bytes.set_len(bytes.len() + written) };

    Ok(EncodedAudio {
        bytes,
        mime: "audio/mpeg",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn segment(value: i16, count: usize) -> AudioSegment {
        AudioSegment {
            samples: vec![value; count],
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: 1,
        }
    }

    #[test]
    fn base64_payload_decodes_to_half_as_many_samples() {
        let pcm: Vec<u8> = vec![0x01, 0x02, 0x03, 0x04];
        let payload = BASE64.encode(&pcm);
        let seg = AudioSegment::from_base64(&payload).unwrap();
        assert_eq!(seg.sample_count(), 2);
        assert_eq!(seg.samples, vec![0x0201, 0x0403]);
        assert_eq!(seg.sample_rate, 24_000);
        assert_eq!(seg.channels, 1);
    }

    #[test]
    fn empty_payload_is_no_audio_data() {
        let err = AudioSegment::from_base64("").unwrap_err();
        assert!(matches!(err, AudioError::NoAudioData));
        assert!(err.to_string().contains("no audio data"));
    }

    #[test]
    fn odd_byte_count_is_rejected() {
        let payload = BASE64.encode([0u8; 3]);
        assert!(matches!(
            AudioSegment::from_base64(&payload),
            Err(AudioError::OddByteCount(3))
        ));
    }

    #[test]
    fn two_seconds_of_speech_has_expected_duration() {
        let seg = segment(0, 48_000);
        assert_eq!(seg.sample_count(), 48_000);
        assert!((seg.duration_secs() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concat_preserves_order_and_sums_lengths() {
        let a = segment(1, 10);
        let b = segment(2, 20);
        let joined = concat(&[&a, &b, &a]).unwrap();
        assert_eq!(joined.sample_count(), 40);
        assert_eq!(joined.samples[..10], vec![1; 10][..]);
        assert_eq!(joined.samples[10..30], vec![2; 20][..]);
        assert_eq!(joined.samples[30..], vec![1; 10][..]);
    }

    #[test]
    fn concat_rejects_sample_rate_mismatch() {
        let speech = segment(0, 100);
        let mut theme = segment(0, 100);
        theme.sample_rate = 44_100;
        let err = concat(&[&theme, &speech, &theme]).unwrap_err();
        assert!(matches!(
            err,
            AudioError::SampleRateMismatch { expected: 44_100, got: 24_000 }
        ));
    }

    #[test]
    fn concat_rejects_channel_mismatch() {
        let speech = segment(0, 100);
        let mut theme = segment(0, 100);
        theme.channels = 2;
        assert!(matches!(
            concat(&[&speech, &theme]).unwrap_err(),
            AudioError::ChannelMismatch { expected: 1, got: 2 }
        ));
    }

    #[test]
    fn wav_output_round_trips_through_hound() {
        let seg = segment(123, 4800);
        let encoded = encode(&seg, EncodeFormat::Wav).unwrap();
        assert_eq!(encoded.mime, "audio/wav");

        let mut reader = hound::WavReader::new(Cursor::new(encoded.bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, seg.samples);
    }

    #[test]
    fn speech_only_assembly_keeps_sample_count() {
        let seg = segment(7, 48_000);
        let encoded = assemble(&seg, None, EncodeFormat::Wav).unwrap();
        let reader = hound::WavReader::new(Cursor::new(encoded.bytes)).unwrap();
        assert_eq!(reader.len(), 48_000);
    }

    #[test]
    fn themed_assembly_brackets_speech() {
        let speech = segment(5, 24_000);
        let theme = segment(9, 12_000);
        let encoded = assemble(&speech, Some(&theme), EncodeFormat::Wav).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(encoded.bytes)).unwrap();
        // theme + speech + theme = 0.5s + 1.0s + 0.5s
        assert_eq!(reader.len(), 48_000);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples[0], 9);
        assert_eq!(samples[12_000], 5);
        assert_eq!(samples[36_000], 9);
        assert_eq!(samples[47_999], 9);
    }

    #[test]
    fn mp3_encoding_produces_a_nonempty_stream() {
        let seg = segment(100, MP3_BLOCK_SIZE * 8);
        let encoded = encode(&seg, EncodeFormat::Mp3 { bitrate_kbps: 128 }).unwrap();
        assert_eq!(encoded.mime, "audio/mpeg");
        assert!(!encoded.bytes.is_empty());
    }

    #[test]
    fn unsupported_bitrate_is_an_encoder_error() {
        let seg = segment(0, 1152);
        assert!(matches!(
            encode(&seg, EncodeFormat::Mp3 { bitrate_kbps: 100 }),
            Err(AudioError::Encoder(_))
        ));
    }

    #[test]
    fn wav_file_theme_loads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..2400 {
            writer.write_sample(42i16).unwrap();
        }
        writer.finalize().unwrap();

        let theme = AudioSegment::from_wav_file(&path).unwrap();
        assert_eq!(theme.sample_count(), 2400);
        assert_eq!(theme.sample_rate, 24_000);
        assert_eq!(theme.samples[0], 42);
    }
}
