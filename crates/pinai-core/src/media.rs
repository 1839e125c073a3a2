//! Helpers for generated media: data URLs, WAV wrapping and files on disk

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::state::{GeneratedMedia, MediaKind};

/// Speech comes back as 16-bit mono PCM at this rate unless the MIME type says otherwise
pub const DEFAULT_PCM_RATE: u32 = 24_000;

pub fn data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::attachment("not a data URL"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| Error::attachment("data URL is not base64 encoded"))?;
    Ok((mime.to_string(), STANDARD.decode(payload)?))
}

/// Directory generated media lands in when the config doesn't name one.
pub fn default_media_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pinai")
        .join("media")
}

fn is_raw_pcm(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "audio/l16" || essence == "audio/pcm"
}

/// Read `rate=` from a MIME type such as `audio/L16;codec=pcm;rate=24000`.
pub fn pcm_rate(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|p| p.trim().strip_prefix("rate="))
        .find_map(|r| r.parse().ok())
}

/// Wrap little-endian 16-bit mono PCM samples in a RIFF/WAVE container.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = pcm.len() as u32;

    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

/// Build a playable data URL for a speech payload.
///
/// Raw PCM is wrapped into WAV; any other audio type is passed through.
pub fn speech_data_url(mime_type: &str, base64_data: &str) -> Result<String> {
    if !is_raw_pcm(mime_type) {
        return Ok(data_url(mime_type, base64_data));
    }
    let pcm = STANDARD.decode(base64_data)?;
    let rate = pcm_rate(mime_type).unwrap_or(DEFAULT_PCM_RATE);
    let wav = pcm_to_wav(&pcm, rate);
    Ok(data_url("audio/wav", &STANDARD.encode(wav)))
}

/// `file://` URL for a path; relative paths are resolved against the working directory.
pub fn file_url(path: &Path) -> Result<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .map_err(|_| Error::config(format!("cannot build a file URL for {}", absolute.display())))
}

fn extension_for(mime_type: &str, kind: MediaKind) -> &'static str {
    match mime_type {
        "audio/wav" | "audio/x-wav" => "wav",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "video/mp4" => "mp4",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first().copied())
            .unwrap_or(match kind {
                MediaKind::Image => "png",
                MediaKind::Video => "mp4",
                MediaKind::Audio => "wav",
            }),
    }
}

/// Write downloaded video bytes into `dir` and return the file path.
pub async fn save_video(dir: &Path, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("pinai-video-{}.mp4", Uuid::new_v4()));
    tokio::fs::write(&path, bytes).await?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved generated video");
    Ok(path)
}

/// Persist a gallery item and return where it lives on disk.
///
/// Data URLs are decoded and written to `dir`; `file://` URLs are already on
/// disk and are returned as-is.
pub async fn save_media(media: &GeneratedMedia, dir: &Path) -> Result<PathBuf> {
    if media.url.starts_with("file:") {
        let url = Url::parse(&media.url).map_err(|e| Error::config(e.to_string()))?;
        return url
            .to_file_path()
            .map_err(|_| Error::config(format!("not a local file URL: {}", media.url)));
    }

    let (mime, bytes) = decode_data_url(&media.url)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!(
        "pinai-{}-{}.{}",
        media.kind,
        Uuid::new_v4(),
        extension_for(&mime, media.kind)
    ));
    tokio::fs::write(&path, &bytes).await?;
    tracing::info!(path = %path.display(), kind = %media.kind, "saved generated media");
    Ok(path)
}
