//! Uploaded audio bytes -> 16kHz mono f32 samples for transcription.
//!
//! Decode with symphonia (container + codec detection from the byte stream),
//! downmix to mono by channel averaging, then sinc-resample to 16kHz with
//! rubato.

use crate::{Error, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Input frames per resampler call.
const RESAMPLE_CHUNK: usize = 1024;

/// Decodes a complete audio clip to mono f32 at 16kHz.
pub fn decode_to_mono_16k(bytes: &[u8]) -> Result<Vec<f32>> {
    let (samples, sample_rate) = decode_mono(bytes)?;

    if sample_rate == TARGET_SAMPLE_RATE {
        return Ok(samples);
    }
    resample(&samples, sample_rate)
}

/// Decodes to mono at the source sample rate.
fn decode_mono(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::audio(format!("unrecognized audio format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| Error::audio("no audio track found"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::audio(format!("unsupported codec: {e}")))?;

    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream surfaces as an IO error on the underlying cursor.
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(Error::audio(format!("demux error: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Skip corrupt packets the way a streaming player would.
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {e}");
                continue;
            }
            Err(e) => return Err(Error::audio(format!("decode error: {e}"))),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let channels = spec.channels.count();

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        if channels <= 1 {
            samples.extend_from_slice(buf.samples());
        } else {
            // Downmix interleaved frames by channel averaging.
            samples.extend(
                buf.samples()
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(Error::audio("no audio samples decoded"));
    }

    debug!(
        samples = samples.len(),
        sample_rate, "Audio decoded to mono"
    );
    Ok((samples, sample_rate))
}

/// Sinc-resamples a whole mono clip from `from_rate` to 16kHz.
fn resample(input: &[f32], from_rate: u32) -> Result<Vec<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(TARGET_SAMPLE_RATE) / f64::from(from_rate);
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| Error::audio(format!("failed to create resampler: {e}")))?;

    let mut output = Vec::with_capacity((input.len() as f64 * ratio) as usize + RESAMPLE_CHUNK);

    for chunk in input.chunks(RESAMPLE_CHUNK) {
        let resampled = if chunk.len() == RESAMPLE_CHUNK {
            resampler.process(&[chunk], None)
        } else {
            // Final short chunk
            resampler.process_partial(Some(&[chunk]), None)
        }
        .map_err(|e| Error::audio(format!("resample error: {e}")))?;
        output.extend_from_slice(&resampled[0]);
    }

    debug!(
        input_len = input.len(),
        output_len = output.len(),
        from_rate,
        "Audio resampled"
    );
    Ok(output)
}
