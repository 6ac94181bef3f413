//! WAV helpers for 16-bit PCM.

use crate::error::SpeechError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;

fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Encodes mono PCM samples as an in-memory WAV file.
///
/// # Errors
///
/// Returns [`SpeechError::InvalidInput`] for a zero sample rate, or
/// [`SpeechError::Audio`] if encoding fails.
pub fn pcm_to_wav_bytes(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, SpeechError> {
    if sample_rate == 0 {
        return Err(SpeechError::InvalidInput("sample rate must be non-zero".into()));
    }

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer = WavWriter::new(&mut cursor, mono_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Reads a 16-bit integer WAV file, downmixing to mono.
///
/// Returns the samples and the sample rate.
///
/// # Errors
///
/// Returns [`SpeechError::InvalidInput`] if the file is not 16-bit integer
/// PCM, or [`SpeechError::Audio`] if it cannot be read.
pub fn read_wav(path: impl AsRef<Path>) -> Result<(Vec<i16>, u32), SpeechError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(SpeechError::InvalidInput(format!(
            "expected 16-bit integer PCM, got {} bits {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let interleaved = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    };
    Ok((samples, spec.sample_rate))
}

/// Writes mono PCM samples to a WAV file.
///
/// # Errors
///
/// Returns [`SpeechError::Audio`] if the file cannot be written.
pub fn write_wav(
    path: impl AsRef<Path>,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), SpeechError> {
    let mut writer = WavWriter::create(path, mono_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_bytes_have_riff_header() {
        let bytes = pcm_to_wav_bytes(&[0, 1000, -1000, 0], 16_000).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 8);
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        assert!(matches!(
            pcm_to_wav_bytes(&[1, 2], 0),
            Err(SpeechError::InvalidInput(_))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let samples: Vec<i16> = (0..160).map(|i| (i * 100) as i16).collect();

        write_wav(&path, &samples, 8_000).unwrap();
        let (read, rate) = read_wav(&path).unwrap();

        assert_eq!(rate, 8_000);
        assert_eq!(read, samples);
    }

    #[test]
    fn stereo_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            ..mono_spec(16_000)
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(100i16, 300i16), (-200, -400)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let (read, _) = read_wav(&path).unwrap();
        assert_eq!(read, vec![200, -300]);
    }
}
