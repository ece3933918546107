use crate::source_trait::{AudioRead, AudioSource};
use async_trait::async_trait;
use voxstream_core::AudioError;

/// An audio source backed by an owned byte buffer.
pub struct MemorySource {
    name: String,
    data: Vec<u8>,
    position: usize,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_name("memory", data)
    }

    pub fn with_name(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

#[async_trait]
impl AudioSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<AudioRead, AudioError> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;

        if self.remaining() == 0 && n < buf.len() {
            Ok(AudioRead::End(n))
        } else {
            Ok(AudioRead::Data(n))
        }
    }
}
