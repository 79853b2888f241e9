//! Per-request chunk cursor over one asset's bytes.

use loreforge_model::Asset;
use loreforge_protocol::{AssetChunk, AssetHeader};

/// Cursor that walks an asset's bytes in fixed-size chunks.
///
/// One producer exists per (client, asset) request; it is dropped when
/// the last chunk is handed out or the connection goes away.
#[derive(Debug)]
pub struct AssetProducer {
    asset: Asset,
    chunk_size: usize,
    position: usize,
}

impl AssetProducer {
    pub fn new(asset: Asset, chunk_size: usize) -> Self {
        Self {
            asset,
            chunk_size: chunk_size.max(1),
            position: 0,
        }
    }

    pub fn header(&self) -> AssetHeader {
        AssetHeader {
            key: self.asset.key,
            name: self.asset.name.clone(),
            size: self.asset.size(),
        }
    }

    /// True once every byte has been handed out.
    pub fn is_complete(&self) -> bool {
        if self.asset.size() == 0 {
            self.position > 0
        } else {
            self.position >= self.asset.size()
        }
    }

    /// Produces the next chunk.
    ///
    /// A zero-length asset still yields exactly one (empty, last) chunk
    /// so the receiver always sees a terminator. Returns `None` once
    /// complete.
    pub fn next_chunk(&mut self) -> Option<AssetChunk> {
        if self.is_complete() {
            return None;
        }
        let start = self.position;
        let end = (start + self.chunk_size).min(self.asset.size());
        self.position = if self.asset.size() == 0 { 1 } else { end };
        Some(AssetChunk {
            key: self.asset.key,
            offset: start,
            data: self.asset.data[start..end].to_vec(),
            last: end >= self.asset.size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_cover_asset_in_order() {
        let asset = Asset::new("map", (0u8..=99).collect());
        let mut producer = AssetProducer::new(asset.clone(), 32);
        assert_eq!(producer.header().size, 100);

        let mut assembled = Vec::new();
        let mut chunks = 0;
        while let Some(chunk) = producer.next_chunk() {
            assert_eq!(chunk.offset, assembled.len());
            assembled.extend_from_slice(&chunk.data);
            chunks += 1;
            if chunk.last {
                break;
            }
        }
        assert_eq!(chunks, 4);
        assert_eq!(assembled, asset.data);
        assert!(producer.is_complete());
        assert!(producer.next_chunk().is_none());
    }

    #[test]
    fn test_empty_asset_yields_single_last_chunk() {
        let mut producer =
            AssetProducer::new(Asset::new("empty", Vec::new()), 1024);
        let chunk = producer.next_chunk().unwrap();
        assert!(chunk.data.is_empty());
        assert!(chunk.last);
        assert!(producer.next_chunk().is_none());
    }

    #[test]
    fn test_degenerate_chunk_size_is_clamped() {
        let mut producer =
            AssetProducer::new(Asset::new("tiny", vec![7, 8]), 0);
        let first = producer.next_chunk().unwrap();
        assert_eq!(first.data, vec![7]);
        assert!(!first.last);
        let second = producer.next_chunk().unwrap();
        assert_eq!(second.data, vec![8]);
        assert!(second.last);
    }
}
