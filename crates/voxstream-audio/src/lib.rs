pub mod file_source;
pub mod memory;
pub mod source_trait;
pub mod wav;

pub use file_source::FileSource;
pub use memory::MemorySource;
pub use source_trait::{AudioRead, AudioSource};
pub use wav::{open_wav, WavFormat};

use std::path::Path;
use voxstream_core::AudioError;

/// Returns `true` if the path names a WAV container.
pub fn is_wav_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Open the audio source for an input file.
///
/// WAV containers are decoded and checked against `format`; any other file
/// is streamed as raw bytes.
pub async fn open_source(path: &Path, format: WavFormat) -> Result<Box<dyn AudioSource>, AudioError> {
    if is_wav_path(path) {
        Ok(Box::new(open_wav(path, format).await?))
    } else {
        Ok(Box::new(FileSource::open(path).await?))
    }
}
