//! Property tests for chunk-independent decoding, resynchronization and the
//! ring buffer's accounting.

use std::collections::VecDeque;
use std::io::Read;

use bytes::BytesMut;
use bytesync_frame::{
    crc16_ccitt, encode_frame, Crc16, Deframer, DeframerConfig, FrameError, FrameReader,
    OwnedFrame, Outcome, RingBuffer,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct FrameParts {
    flags: u8,
    sequence: u8,
    msg_type: u8,
    payload: Vec<u8>,
}

fn encode_all(frames: &[FrameParts]) -> Vec<u8> {
    let mut wire = BytesMut::new();
    for f in frames {
        encode_frame(f.flags, f.sequence, f.msg_type, &f.payload, &mut wire).unwrap();
    }
    wire.to_vec()
}

fn drain(deframer: &mut Deframer, ring: &mut RingBuffer, out: &mut Vec<OwnedFrame>) {
    loop {
        match deframer.try_parse_next(ring) {
            Outcome::Frame(frame) => out.push(frame.into_owned()),
            Outcome::Resynced(_) => {}
            Outcome::NeedMoreData | Outcome::Empty => break,
        }
    }
}

fn feed(wire: &[u8], chunks: &[usize], max_frame_len: usize) -> (Vec<OwnedFrame>, Deframer) {
    let mut deframer = Deframer::new(DeframerConfig { max_frame_len }).unwrap();
    let mut ring = RingBuffer::new(512).unwrap();
    let mut out = Vec::new();

    let mut offset = 0;
    let mut sizes = chunks.iter().cycle();
    while offset < wire.len() {
        let size = (*sizes.next().unwrap()).min(wire.len() - offset);
        ring.write(&wire[offset..offset + size]).unwrap();
        offset += size;
        drain(&mut deframer, &mut ring, &mut out);
    }
    finish(&mut deframer, &mut ring, &mut out);
    (out, deframer)
}

/// End of input: abandon undecided candidates until nothing is left to scan.
fn finish(deframer: &mut Deframer, ring: &mut RingBuffer, out: &mut Vec<OwnedFrame>) {
    loop {
        match deframer.try_parse_next(ring) {
            Outcome::Frame(frame) => out.push(frame.into_owned()),
            Outcome::Resynced(_) => {}
            Outcome::NeedMoreData => {
                deframer.abandon_candidate(ring);
            }
            Outcome::Empty => break,
        }
    }
}

struct ChunkedReader {
    bytes: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf
            .len()
            .min(self.chunk)
            .min(self.bytes.len() - self.pos);
        buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn read_all(wire: Vec<u8>, chunk: usize) -> Vec<OwnedFrame> {
    let mut reader = FrameReader::new(ChunkedReader {
        bytes: wire,
        pos: 0,
        chunk,
    })
    .unwrap();
    let mut out = Vec::new();
    loop {
        match reader.read_frame() {
            Ok(frame) => out.push(frame),
            Err(FrameError::ConnectionClosed) => break,
            Err(other) => panic!("unexpected error {other}"),
        }
    }
    assert!(reader.buffered() <= 1);
    out
}

fn assert_same(decoded: &[OwnedFrame], expected: &[FrameParts]) {
    assert_eq!(decoded.len(), expected.len());
    for (got, want) in decoded.iter().zip(expected) {
        assert_eq!(got.flags, want.flags);
        assert_eq!(got.sequence, want.sequence);
        assert_eq!(got.msg_type, want.msg_type);
        assert_eq!(got.payload.as_ref(), want.payload.as_slice());
    }
}

prop_compose! {
    fn any_frame()(
        flags in any::<u8>(),
        sequence in any::<u8>(),
        msg_type in any::<u8>(),
        payload in prop::collection::vec(any::<u8>(), 0..64),
    ) -> FrameParts {
        FrameParts { flags, sequence, msg_type, payload }
    }
}

// Header and payload bytes stay below 0x80, so neither they nor a single
// low-bit flip can form a sync pattern.
prop_compose! {
    fn low_frame()(
        flags in 0u8..0x80,
        sequence in 0u8..0x80,
        msg_type in 0u8..0x80,
        payload in prop::collection::vec(0u8..0x80, 1..64),
    ) -> FrameParts {
        FrameParts { flags, sequence, msg_type, payload }
    }
}

proptest! {
    #[test]
    fn decoding_is_independent_of_chunking(
        frames in prop::collection::vec(any_frame(), 1..8),
        chunks in prop::collection::vec(1usize..32, 1..8),
    ) {
        let wire = encode_all(&frames);
        let (decoded, deframer) = feed(&wire, &chunks, 1024);

        assert_same(&decoded, &frames);
        prop_assert_eq!(deframer.stats().resyncs, 0);
        prop_assert_eq!(deframer.stats().bytes_discarded, 0);
    }

    #[test]
    fn leading_noise_is_discarded(
        noise in prop::collection::vec(any::<u8>().prop_filter("no sync byte", |b| *b != 0xAA), 0..128),
        frames in prop::collection::vec(any_frame(), 1..4),
        chunks in prop::collection::vec(1usize..32, 1..4),
    ) {
        let mut wire = noise.clone();
        wire.extend(encode_all(&frames));
        let (decoded, deframer) = feed(&wire, &chunks, 1024);

        assert_same(&decoded, &frames);
        prop_assert_eq!(deframer.stats().bytes_discarded, noise.len() as u64);
    }

    #[test]
    fn corrupted_frame_does_not_hide_following_frames(
        before in prop::collection::vec(low_frame(), 0..3),
        victim in low_frame(),
        after in prop::collection::vec(low_frame(), 1..4),
        flip_at in any::<prop::sample::Index>(),
        bit in 0u32..7,
        chunks in prop::collection::vec(1usize..32, 1..4),
    ) {
        let mut wire = encode_all(&before);
        let mut corrupted = encode_all(std::slice::from_ref(&victim));
        let at = 7 + flip_at.index(victim.payload.len());
        corrupted[at] ^= 1 << bit;
        wire.extend(corrupted);
        wire.extend(encode_all(&after));

        let (decoded, deframer) = feed(&wire, &chunks, 128);

        let mut expected = before.clone();
        expected.extend(after.iter().cloned());
        assert_same(&decoded, &expected);
        prop_assert!(deframer.stats().bad_crc >= 1);
    }

    #[test]
    fn reader_stops_cleanly_after_trailing_corrupted_frame(
        before in prop::collection::vec(low_frame(), 0..4),
        victim in low_frame(),
        flip_at in any::<prop::sample::Index>(),
        bit in 0u32..7,
        chunk in 1usize..32,
    ) {
        let mut wire = encode_all(&before);
        let mut corrupted = encode_all(std::slice::from_ref(&victim));
        let at = flip_at.index(corrupted.len() - 2) + 2;
        corrupted[at] ^= 1 << bit;
        wire.extend(corrupted);

        assert_same(&read_all(wire, chunk), &before);
    }

    #[test]
    fn reader_recovers_frames_behind_truncated_candidate(
        before in prop::collection::vec(low_frame(), 0..3),
        victim in low_frame(),
        after in prop::collection::vec(low_frame(), 1..4),
        chunk in 1usize..32,
    ) {
        let mut wire = encode_all(&before);
        let mut truncated = encode_all(std::slice::from_ref(&victim));
        // Declared length of at least 768 bytes runs past the end of input.
        truncated[4] = 0x03;
        wire.extend(truncated);
        wire.extend(encode_all(&after));

        let mut expected = before.clone();
        expected.extend(after.iter().cloned());
        assert_same(&read_all(wire, chunk), &expected);
    }

    #[test]
    fn ring_buffer_matches_queue_model(
        ops in prop::collection::vec(
            prop_oneof![
                prop::collection::vec(any::<u8>(), 0..24).prop_map(Ok::<Vec<u8>, usize>),
                (0usize..24).prop_map(Err::<Vec<u8>, usize>),
            ],
            1..200,
        ),
    ) {
        let mut ring = RingBuffer::new(48).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Ok(data) => match ring.write(&data) {
                    Ok(()) => model.extend(&data),
                    Err(FrameError::BufferFull { requested, free }) => {
                        prop_assert_eq!(requested, data.len());
                        prop_assert!(requested > free);
                        prop_assert_eq!(free, 48 - model.len());
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other}"),
                },
                Err(n) => {
                    let result = ring.consume(n);
                    if n <= model.len() {
                        prop_assert!(result.is_ok());
                        model.drain(..n);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
            }

            prop_assert_eq!(ring.available(), model.len());
            prop_assert_eq!(ring.free_space(), 48 - model.len());
            prop_assert_eq!(ring.contents().to_vec(), model.iter().copied().collect::<Vec<_>>());
        }
    }

    #[test]
    fn crc_is_split_independent(
        data in prop::collection::vec(any::<u8>(), 0..256),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(data.len() + 1);
        let (a, b) = data.split_at(at);
        prop_assert_eq!(Crc16::new().update(a).update(b).finish(), crc16_ccitt(&data));
    }
}
