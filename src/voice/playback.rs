//! Audio playback to speakers

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cpal::SampleRate;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::{Error, Result};

/// Play MP3 bytes on the default output device
///
/// Decoding and the stream run on a blocking worker thread; the call returns
/// once the last sample has been handed to the device (with a bounded wait,
/// so a stalled device never hangs the session).
///
/// # Errors
///
/// Returns an error if decoding fails or no output device is available.
pub async fn play_mp3(mp3: Vec<u8>) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let (samples, sample_rate) = decode_mp3(&mp3)?;
        play_blocking(samples, sample_rate)
    })
    .await
    .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
}

fn play_blocking(samples: Vec<f32>, sample_rate: u32) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

    let supported_config = device
        .supported_output_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .or_else(|| {
            // Fallback: stereo, duplicating the mono signal
            device.supported_output_configs().ok()?.find(|c| {
                c.channels() == 2
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
        })
        .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

    let config = supported_config
        .with_sample_rate(SampleRate(sample_rate))
        .config();
    let channels = usize::from(config.channels);

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels,
        samples = samples.len(),
        "starting playback"
    );

    let sample_count = samples.len();
    let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);

    let mut pos = 0usize;
    let mut done_tx = Some(done_tx);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = if pos < samples.len() {
                        let s = samples[pos];
                        pos += 1;
                        s
                    } else {
                        if let Some(tx) = done_tx.take() {
                            tx.send(()).ok();
                        }
                        0.0
                    };

                    for out in frame {
                        *out = sample;
                    }
                }
            },
            |err| {
                tracing::error!(error = %err, "audio playback error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    // Wait for the callback to run out of samples, bounded by the audio
    // length plus a margin
    let duration_ms = (sample_count as u64 * 1000) / u64::from(sample_rate);
    if done_rx
        .recv_timeout(Duration::from_millis(duration_ms + 2000))
        .is_err()
    {
        tracing::warn!("playback did not signal completion, stopping anyway");
    }

    // Let the device drain its last buffer
    thread::sleep(Duration::from_millis(100));
    drop(stream);

    tracing::debug!(samples = sample_count, "playback complete");
    Ok(())
}

/// Decode MP3 bytes to mono f32 samples plus the stream's sample rate
fn decode_mp3(mp3: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3));
    let mut samples = Vec::new();
    let mut sample_rate = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate.is_none() {
                    let rate = u32::try_from(frame.sample_rate)
                        .map_err(|_| Error::Audio("invalid MP3 sample rate".to_string()))?;
                    sample_rate = Some(rate);
                }

                if frame.channels == 2 {
                    // Stereo: average channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    let sample_rate =
        sample_rate.ok_or_else(|| Error::Audio("MP3 contained no frames".to_string()))?;

    Ok((samples, sample_rate))
}
