use crate::memory::MemorySource;
use std::path::{Path, PathBuf};
use voxstream_core::{AudioEncoding, AudioError};

/// Raw sample layout a WAV file must carry to be streamed as `encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub encoding: AudioEncoding,
    pub channels: u16,
    pub sample_rate: u32,
}

fn map_hound_error(path: &Path, err: hound::Error) -> AudioError {
    match err {
        hound::Error::IoError(e) => AudioError::Open(format!("{}: {e}", path.display())),
        other => AudioError::Decode(format!("{}: {other}", path.display())),
    }
}

fn check_spec(spec: &hound::WavSpec, expected: &WavFormat) -> Result<(), AudioError> {
    if spec.channels != expected.channels {
        return Err(AudioError::FormatMismatch(format!(
            "file has {} channel(s), expected {}",
            spec.channels, expected.channels
        )));
    }
    if spec.sample_rate != expected.sample_rate {
        return Err(AudioError::FormatMismatch(format!(
            "file is sampled at {}Hz, expected {}Hz",
            spec.sample_rate, expected.sample_rate
        )));
    }

    let layout_ok = match expected.encoding {
        AudioEncoding::Linear16 => {
            spec.sample_format == hound::SampleFormat::Int && spec.bits_per_sample == 16
        }
        AudioEncoding::Linear32F => {
            spec.sample_format == hound::SampleFormat::Float && spec.bits_per_sample == 32
        }
        other => {
            return Err(AudioError::UnsupportedEncoding(format!(
                "{other} cannot be read from a WAV container"
            )))
        }
    };
    if !layout_ok {
        return Err(AudioError::FormatMismatch(format!(
            "file holds {}-bit {:?} samples, which is not {}",
            spec.bits_per_sample, spec.sample_format, expected.encoding
        )));
    }
    Ok(())
}

fn decode_blocking(path: &Path, expected: &WavFormat) -> Result<Vec<u8>, AudioError> {
    let reader = hound::WavReader::open(path).map_err(|e| map_hound_error(path, e))?;
    let spec = reader.spec();
    check_spec(&spec, expected)?;

    let mut bytes = Vec::with_capacity(reader.len() as usize * (spec.bits_per_sample as usize / 8));
    match expected.encoding {
        AudioEncoding::Linear32F => {
            for sample in reader.into_samples::<f32>() {
                let sample = sample.map_err(|e| map_hound_error(path, e))?;
                bytes.extend_from_slice(&sample.to_le_bytes());
            }
        }
        _ => {
            for sample in reader.into_samples::<i16>() {
                let sample = sample.map_err(|e| map_hound_error(path, e))?;
                bytes.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }
    Ok(bytes)
}

/// Decode a WAV file into its raw little-endian sample payload.
///
/// The header must agree with `expected`; the payload is what the
/// recognizer would receive had the samples been recorded raw.
pub async fn open_wav(path: &Path, expected: WavFormat) -> Result<MemorySource, AudioError> {
    let owned: PathBuf = path.to_path_buf();
    let bytes = tokio::task::spawn_blocking(move || decode_blocking(&owned, &expected))
        .await
        .map_err(|e| AudioError::Decode(format!("decoder task failed: {e}")))??;

    tracing::debug!(
        path = %path.display(),
        encoding = %expected.encoding,
        channels = expected.channels,
        sample_rate = expected.sample_rate,
        bytes = bytes.len(),
        "decoded WAV payload"
    );
    Ok(MemorySource::with_name(&path.display().to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_trait::{AudioRead, AudioSource};

    fn write_i16_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn linear16(channels: u16, sample_rate: u32) -> WavFormat {
        WavFormat {
            encoding: AudioEncoding::Linear16,
            channels,
            sample_rate,
        }
    }

    #[tokio::test]
    async fn test_open_wav_yields_little_endian_payload() {
        let dir = std::env::temp_dir().join("voxstream_wav_payload");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("speech.wav");
        write_i16_wav(&path, 1, 16000, &[1, -2, 300]);

        let mut source = open_wav(&path, linear16(1, 16000)).await.unwrap();
        assert_eq!(source.len(), 6);

        let mut buf = [0u8; 16];
        assert_eq!(source.read(&mut buf).await.unwrap(), AudioRead::End(6));
        let mut expected = Vec::new();
        for s in [1i16, -2, 300] {
            expected.extend_from_slice(&s.to_le_bytes());
        }
        assert_eq!(&buf[..6], expected.as_slice());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_open_wav_channel_mismatch_fails() {
        let dir = std::env::temp_dir().join("voxstream_wav_channels");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stereo.wav");
        write_i16_wav(&path, 2, 16000, &[0, 0, 0, 0]);

        match open_wav(&path, linear16(1, 16000)).await {
            Err(AudioError::FormatMismatch(msg)) => assert!(msg.contains("channel")),
            _ => panic!("expected FormatMismatch"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_open_wav_rate_mismatch_fails() {
        let dir = std::env::temp_dir().join("voxstream_wav_rate");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("hi_rate.wav");
        write_i16_wav(&path, 1, 48000, &[0, 0]);

        match open_wav(&path, linear16(1, 16000)).await {
            Err(AudioError::FormatMismatch(msg)) => assert!(msg.contains("48000")),
            _ => panic!("expected FormatMismatch"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_open_wav_float_encoding_against_int_file_fails() {
        let dir = std::env::temp_dir().join("voxstream_wav_layout");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("int16.wav");
        write_i16_wav(&path, 1, 16000, &[5]);

        let expected = WavFormat {
            encoding: AudioEncoding::Linear32F,
            channels: 1,
            sample_rate: 16000,
        };
        assert!(matches!(
            open_wav(&path, expected).await,
            Err(AudioError::FormatMismatch(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_open_wav_companded_encoding_unsupported() {
        let dir = std::env::temp_dir().join("voxstream_wav_mulaw");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pcm.wav");
        write_i16_wav(&path, 1, 8000, &[5]);

        let expected = WavFormat {
            encoding: AudioEncoding::Mulaw,
            channels: 1,
            sample_rate: 8000,
        };
        assert!(matches!(
            open_wav(&path, expected).await,
            Err(AudioError::UnsupportedEncoding(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_open_wav_missing_file_is_open_error() {
        let result = open_wav(Path::new("/nonexistent/voxstream.wav"), linear16(1, 16000)).await;
        assert!(matches!(result, Err(AudioError::Open(_))));
    }

    #[tokio::test]
    async fn test_open_wav_garbage_is_decode_error() {
        let dir = std::env::temp_dir().join("voxstream_wav_garbage");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        assert!(matches!(
            open_wav(&path, linear16(1, 16000)).await,
            Err(AudioError::Decode(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
