//! `tokio_util` codec over the same ring buffer and de-framer used by the
//! blocking reader.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{FrameConfig, OwnedFrame};
use crate::deframer::{Deframer, DeframerConfig, DeframerStats, Outcome};
use crate::error::FrameError;
use crate::ring::RingBuffer;

/// Frames a byte stream for `tokio_util::codec::Framed`.
///
/// Incoming bytes move from the framed read buffer into a fixed-capacity
/// ring, so memory stays bounded no matter how fast the peer writes.
#[derive(Debug)]
pub struct BsCodec {
    ring: RingBuffer,
    deframer: Deframer,
}

impl BsCodec {
    pub fn new() -> Result<Self, FrameError> {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Result<Self, FrameError> {
        config.validate()?;
        Ok(Self {
            ring: RingBuffer::new(config.buffer_capacity)?,
            deframer: Deframer::new(DeframerConfig {
                max_frame_len: config.max_frame_len,
            })?,
        })
    }

    pub fn stats(&self) -> DeframerStats {
        self.deframer.stats()
    }

    fn fill(&mut self, src: &mut BytesMut) -> Result<(), FrameError> {
        let n = src.len().min(self.ring.free_space());
        if n > 0 {
            self.ring.write(&src[..n])?;
            src.advance(n);
        }
        Ok(())
    }
}

impl Decoder for BsCodec {
    type Item = OwnedFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            self.fill(src)?;
            match self.deframer.try_parse_next(&mut self.ring) {
                Outcome::Frame(frame) => return Ok(Some(frame.into_owned())),
                Outcome::Resynced(_) => continue,
                Outcome::NeedMoreData | Outcome::Empty => {
                    if src.is_empty() || self.ring.is_full() {
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            self.fill(src)?;
            match self.deframer.try_parse_next(&mut self.ring) {
                Outcome::Frame(frame) => return Ok(Some(frame.into_owned())),
                Outcome::Resynced(_) => {}
                // Nothing more will arrive to complete the candidate.
                Outcome::NeedMoreData => {
                    self.deframer.abandon_candidate(&mut self.ring);
                }
                Outcome::Empty => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
            }
        }
    }
}

impl Encoder<OwnedFrame> for BsCodec {
    type Error = FrameError;

    fn encode(&mut self, item: OwnedFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::{duplex, AsyncWriteExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codec::encode_frame;

    #[test]
    fn decode_across_split_buffers() {
        let mut wire = BytesMut::new();
        encode_frame(0, 1, 2, b"split", &mut wire).unwrap();
        let mut codec = BsCodec::new().unwrap();

        let mut src = BytesMut::from(&wire[..6]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());

        src.extend_from_slice(&wire[6..]);
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"split");
    }

    #[test]
    fn decode_leaves_overflow_in_source() {
        let cfg = FrameConfig {
            max_frame_len: 32,
            buffer_capacity: 32,
        };
        let mut codec = BsCodec::with_config(cfg).unwrap();
        let mut src = BytesMut::new();
        for seq in 0..4 {
            encode_frame(0, seq, 0, b"0123456789", &mut src).unwrap();
        }

        let mut seen = Vec::new();
        while let Some(frame) = codec.decode(&mut src).unwrap() {
            seen.push(frame.sequence);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert!(src.is_empty());
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (client, server) = duplex(64);
        let mut sink = FramedWrite::new(client, BsCodec::new().unwrap());
        let mut stream = FramedRead::new(server, BsCodec::new().unwrap());

        let writer = tokio::spawn(async move {
            for seq in 0..20u8 {
                let frame = OwnedFrame::new(0, seq, 0x33, vec![seq; 40]).unwrap();
                sink.send(frame).await.unwrap();
            }
        });

        for seq in 0..20u8 {
            let frame = stream.next().await.unwrap().unwrap();
            assert_eq!(frame.sequence, seq);
            assert_eq!(frame.payload.as_ref(), vec![seq; 40].as_slice());
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn framed_read_skips_noise() {
        let (mut client, server) = duplex(256);
        let mut stream = FramedRead::new(server, BsCodec::new().unwrap());

        let mut wire = BytesMut::from(&b"garbage\xAA"[..]);
        encode_frame(0, 9, 1, b"after noise", &mut wire).unwrap();
        client.write_all(&wire).await.unwrap();
        drop(client);

        let frame = stream.next().await.unwrap().unwrap();
        assert_eq!(frame.sequence, 9);
        assert_eq!(frame.payload.as_ref(), b"after noise");
        assert!(stream.decoder().stats().resyncs >= 1);
    }

    #[tokio::test]
    async fn frame_behind_truncated_candidate_is_delivered_at_eof() {
        let (mut client, server) = duplex(256);
        let mut stream = FramedRead::new(server, BsCodec::new().unwrap());

        let mut wire = BytesMut::from(&[0xAAu8, 0x55, 0x00, 0xC8, 0x00, 0x00, 0x00][..]);
        encode_frame(0, 5, 1, b"real", &mut wire).unwrap();
        client.write_all(&wire).await.unwrap();
        drop(client);

        let frame = stream.next().await.unwrap().unwrap();
        assert_eq!(frame.sequence, 5);
        assert_eq!(frame.payload.as_ref(), b"real");
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn decode_eof_drains_to_none() {
        let mut codec = BsCodec::new().unwrap();
        let mut src = BytesMut::from(&[0xAAu8, 0x55, 0x00, 0x40, 0x00, 0x01][..]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
        assert!(codec.stats().resyncs >= 1);
    }
}
