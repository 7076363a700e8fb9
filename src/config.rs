use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::audio::EncodeFormat;

/// Output format for narrated podcast audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
}

/// Podcast audio export options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub format: AudioFormat,
    /// Only used for MP3 output.
    pub bitrate_kbps: u32,
    /// Optional intro/outro theme music (16-bit PCM WAV, 24 kHz mono).
    pub theme_music: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            bitrate_kbps: 128,
            theme_music: None,
        }
    }
}

impl AudioConfig {
    pub fn encode_format(&self) -> EncodeFormat {
        match self.format {
            AudioFormat::Mp3 => EncodeFormat::Mp3 {
                bitrate_kbps: self.bitrate_kbps,
            },
            AudioFormat::Wav => EncodeFormat::Wav,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Config {
    /// Directory: ~/.config/post-studio/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("post-studio");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_audio_config_is_mp3_128() {
        let config = Config::default();
        assert_eq!(config.audio.format, AudioFormat::Mp3);
        assert_eq!(
            config.audio.encode_format(),
            EncodeFormat::Mp3 { bitrate_kbps: 128 }
        );
        assert!(config.audio.theme_music.is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut config = Config::default();
        config.gemini_api_key = "key".into();
        config.audio.format = AudioFormat::Wav;
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gemini_api_key, "key");
        assert_eq!(back.audio.format, AudioFormat::Wav);
    }
}
