//! The block codec: packs a 32 KiB song image into 512-byte blocks and back.
//!
//! The compressed stream is a sequence of small records. `0xC0` opens a
//! run-length record, `0xE0` a special action (dictionary stamp, block jump
//! or end-of-stream), and every other byte is a literal. Blocks are chained
//! through explicit jump records, so a project's blocks need not be
//! physically adjacent inside a save.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::ReadBytesExt;
use more_asserts as ma;
use tracing::debug;

use crate::song::{SongImage, SONG_BYTE_COUNT};
use crate::vio::{Counted, WriteRepeatExt};

/// The size of one block in a save file.
pub const BLOCK_SIZE: usize = 0x200;

/// The number of data blocks in a save file.
pub const BLOCK_COUNT: usize = 191;

const RUN_LENGTH_ENCODING_BYTE: u8 = 0xC0;
const SPECIAL_ACTION_BYTE: u8 = 0xE0;
const DEFAULT_WAVE_BYTE: u8 = 0xF0;
const DEFAULT_INSTRUMENT_BYTE: u8 = 0xF1;
const END_OF_FILE_BYTE: u8 = 0xFF;

/// The wave frame every fresh song carries in all of its wave slots. The
/// codec stamps it through a dedicated record instead of spelling it out.
pub const DEFAULT_WAVE: [u8; 16] = [
    0x8E, 0xCD, 0xCC, 0xBB, 0xAA, 0xA9, 0x99, 0x88, 0x87, 0x76, 0x66, 0x55, 0x54, 0x43, 0x32, 0x31,
];

/// The parameter bytes of an untouched instrument slot, the codec's second
/// dictionary pattern.
pub const DEFAULT_INSTRUMENT: [u8; 16] = [
    0xA8, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x03, 0x00, 0x00, 0xD0, 0x00, 0x00, 0x00, 0xF3, 0x00, 0x00,
];

/// Ways decompressing a project can fail. All of these are fatal for the
/// project at hand; other projects in the same save are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    #[error("compressed stream ended before its end-of-stream record")]
    TruncatedInput,

    #[error("decompressed data would exceed {SONG_BYTE_COUNT:#x} bytes")]
    OutputOverflow,

    #[error("decompressed size does not line up with {SONG_BYTE_COUNT:#x} bytes (but {size:#x})")]
    ShortOutput { size: usize },

    #[error("block jump to invalid or already visited block {target}")]
    BadJump { target: u8 },

    #[error("could not access the compressed stream")]
    Io(#[from] io::Error),
}

/// Ways compressing a song image can fail.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    /// The song does not fit in the blocks it was given. The sink has been
    /// rolled back: everything written is zeroed and the cursor is restored
    /// to where it started. Callers may retry with a different layout.
    #[error("not enough free blocks left to compress the song")]
    BlockBudgetExceeded,

    #[error("could not access the compressed stream")]
    Io(#[from] io::Error),
}

/// One record of the compressed stream. The decoder folds a sequence of
/// these into the output image; the encoder greedily scans the image into
/// the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Literal(u8),
    Run { value: u8, count: u8 },
    DefaultWave { count: u8 },
    DefaultInstrument { count: u8 },
    Jump { block: u8 },
    End,
}

fn read_step_byte<R: Read>(reader: &mut R) -> Result<u8, DecompressError> {
    reader.read_u8().map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => DecompressError::TruncatedInput,
        _ => DecompressError::Io(e),
    })
}

/// Parse the next record off the stream.
fn read_step<R: Read>(reader: &mut R) -> Result<Step, DecompressError> {
    Ok(match read_step_byte(reader)? {
        RUN_LENGTH_ENCODING_BYTE => match read_step_byte(reader)? {
            RUN_LENGTH_ENCODING_BYTE => Step::Literal(RUN_LENGTH_ENCODING_BYTE),
            value => Step::Run {
                value,
                count: read_step_byte(reader)?,
            },
        },
        SPECIAL_ACTION_BYTE => match read_step_byte(reader)? {
            SPECIAL_ACTION_BYTE => Step::Literal(SPECIAL_ACTION_BYTE),
            DEFAULT_WAVE_BYTE => Step::DefaultWave {
                count: read_step_byte(reader)?,
            },
            DEFAULT_INSTRUMENT_BYTE => Step::DefaultInstrument {
                count: read_step_byte(reader)?,
            },
            END_OF_FILE_BYTE => Step::End,
            block => Step::Jump { block },
        },
        byte => Step::Literal(byte),
    })
}

/// Serialise a record into `record`, returning how many bytes it takes.
/// `0xC0` and `0xE0` literals come out as their two-byte self-escapes.
fn encode_step(step: Step, record: &mut [u8; 3]) -> usize {
    match step {
        Step::Literal(byte @ (RUN_LENGTH_ENCODING_BYTE | SPECIAL_ACTION_BYTE)) => {
            record[0] = byte;
            record[1] = byte;
            2
        }
        Step::Literal(byte) => {
            record[0] = byte;
            1
        }
        Step::Run { value, count } => {
            record[0] = RUN_LENGTH_ENCODING_BYTE;
            record[1] = value;
            record[2] = count;
            3
        }
        Step::DefaultWave { count } => {
            record[0] = SPECIAL_ACTION_BYTE;
            record[1] = DEFAULT_WAVE_BYTE;
            record[2] = count;
            3
        }
        Step::DefaultInstrument { count } => {
            record[0] = SPECIAL_ACTION_BYTE;
            record[1] = DEFAULT_INSTRUMENT_BYTE;
            record[2] = count;
            3
        }
        Step::Jump { block } => {
            record[0] = SPECIAL_ACTION_BYTE;
            record[1] = block;
            2
        }
        Step::End => {
            record[0] = SPECIAL_ACTION_BYTE;
            record[1] = END_OF_FILE_BYTE;
            2
        }
    }
}

/// Bounded output buffer for decompression; rejects anything past the fixed
/// image size.
struct Output {
    image: Box<[u8; SONG_BYTE_COUNT]>,
    len: usize,
}

impl Output {
    fn new() -> Output {
        Output {
            image: Box::new([0; SONG_BYTE_COUNT]),
            len: 0,
        }
    }

    fn push(&mut self, byte: u8) -> Result<(), DecompressError> {
        if self.len >= SONG_BYTE_COUNT {
            return Err(DecompressError::OutputOverflow);
        }
        self.image[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    fn push_repeat(&mut self, pattern: &[u8], count: u8) -> Result<(), DecompressError> {
        let total = pattern.len() * count as usize;
        if self.len + total > SONG_BYTE_COUNT {
            return Err(DecompressError::OutputOverflow);
        }
        for _ in 0..count {
            self.image[self.len..self.len + pattern.len()].copy_from_slice(pattern);
            self.len += pattern.len();
        }
        Ok(())
    }
}

/// Decompress one project into a full song image.
///
/// `reader` must be positioned at the first byte of the project's first
/// block. `first_block_offset` is the absolute stream position of block 1;
/// jump targets resolve against it. With `follow_block_jumps` set, `E0 <n>`
/// records move the cursor to block `n`, which is how projects are laid out
/// inside a save. Without it the stream is taken as physically contiguous
/// (the layout of an exported project file) and jump records merely mark
/// block boundaries.
pub fn decompress<R: Read + Seek>(
    reader: &mut R,
    first_block_offset: u64,
    follow_block_jumps: bool,
) -> Result<SongImage, DecompressError> {
    let mut reader = Counted::new(reader);
    let mut output = Output::new();
    let mut visited = [false; BLOCK_COUNT + 1];

    loop {
        let block_start = reader.stream_position()?;
        if follow_block_jumps {
            mark_visited(&mut visited, block_start, first_block_offset);
        }

        match decompress_block(&mut reader, &mut output)? {
            None => break,
            Some(target) => {
                if follow_block_jumps {
                    if !(1..=BLOCK_COUNT as u8).contains(&target) || visited[target as usize] {
                        return Err(DecompressError::BadJump { target });
                    }
                    let offset = first_block_offset + (target as u64 - 1) * BLOCK_SIZE as u64;
                    reader.seek(SeekFrom::Start(offset))?;
                }
            }
        }
    }

    debug_assert_eq!(
        (reader.stream_position()? - first_block_offset) % BLOCK_SIZE as u64,
        0,
        "decoder must stop block-aligned"
    );

    if output.len != SONG_BYTE_COUNT {
        return Err(DecompressError::ShortOutput { size: output.len });
    }

    debug!(
        bytes_read = reader.bytes_read(),
        "decompressed project into a full song image"
    );
    Ok(SongImage::from_boxed(output.image))
}

fn mark_visited(visited: &mut [bool; BLOCK_COUNT + 1], block_start: u64, first_block_offset: u64) {
    if block_start < first_block_offset {
        return;
    }
    let delta = block_start - first_block_offset;
    if delta % BLOCK_SIZE as u64 != 0 {
        return;
    }
    let index = delta / BLOCK_SIZE as u64 + 1;
    if (1..=BLOCK_COUNT as u64).contains(&index) {
        visited[index as usize] = true;
    }
}

/// Decompress records until the block announces where to go next. Returns
/// the jump target, or `None` on end-of-stream. The reader is left at the
/// end of the current block either way.
fn decompress_block<R: Read + Seek>(
    reader: &mut R,
    output: &mut Output,
) -> Result<Option<u8>, DecompressError> {
    let block_start = reader.stream_position()?;
    let next = loop {
        match read_step(reader)? {
            Step::Literal(byte) => output.push(byte)?,
            Step::Run { value, count } => output.push_repeat(&[value], count)?,
            Step::DefaultWave { count } => output.push_repeat(&DEFAULT_WAVE, count)?,
            Step::DefaultInstrument { count } => output.push_repeat(&DEFAULT_INSTRUMENT, count)?,
            Step::Jump { block } => break Some(block),
            Step::End => break None,
        }
    };
    // Skip the zero padding so the cursor lands on the block boundary.
    reader.seek(SeekFrom::Start(block_start + BLOCK_SIZE as u64))?;
    Ok(next)
}

/// How many times `pattern` repeats back-to-back at the head of `rest`,
/// capped at 255.
fn pattern_run(rest: &[u8], pattern: &[u8; 16]) -> u8 {
    let mut count: u8 = 0;
    let mut offset = 0;
    while count < u8::MAX
        && rest.len() >= offset + pattern.len()
        && rest[offset..offset + pattern.len()] == pattern[..]
    {
        count += 1;
        offset += pattern.len();
    }
    count
}

/// Greedy length of the byte run starting `rest`, capped at 255.
fn byte_run(rest: &[u8]) -> u8 {
    let value = rest[0];
    let len = rest.iter().take(0xFF).take_while(|&&b| b == value).count();
    len as u8
}

/// Scan the next record out of the image, returning it along with the
/// number of image bytes it covers. The match arms are ordered; earlier
/// rules pre-empt later ones.
fn scan_step(data: &[u8], position: usize) -> (Step, usize) {
    let rest = &data[position..];

    let count = pattern_run(rest, &DEFAULT_WAVE);
    if count > 0 {
        return (Step::DefaultWave { count }, count as usize * DEFAULT_WAVE.len());
    }
    let count = pattern_run(rest, &DEFAULT_INSTRUMENT);
    if count > 0 {
        return (
            Step::DefaultInstrument { count },
            count as usize * DEFAULT_INSTRUMENT.len(),
        );
    }

    match rest[0] {
        // The escape bytes always go out as their two-byte escapes, even
        // when they repeat.
        byte @ (RUN_LENGTH_ENCODING_BYTE | SPECIAL_ACTION_BYTE) => (Step::Literal(byte), 1),
        value => {
            // Runs shorter than four bytes stay literal; at three bytes the
            // run record stops paying for itself.
            if rest.len() >= 4 && rest[1] == value && rest[2] == value && rest[3] == value {
                let count = byte_run(rest);
                (Step::Run { value, count }, count as usize)
            } else {
                (Step::Literal(value), 1)
            }
        }
    }
}

/// Compress a song image into 512-byte blocks written to `sink`.
///
/// `block_offset` is the 1-based index of the first block being written;
/// chained blocks are numbered on from it, and the emitted jump records use
/// those absolute indices. At most `block_budget` blocks are written. On
/// success returns the number of blocks used; if the budget runs out, the
/// sink is rolled back (zeroed and repositioned) and
/// [`CompressError::BlockBudgetExceeded`] comes back.
pub fn compress<W: Write + Seek>(
    image: &SongImage,
    sink: &mut W,
    block_offset: u8,
    block_budget: u8,
) -> Result<u8, CompressError> {
    ma::debug_assert_le!(
        block_offset as usize + block_budget as usize,
        BLOCK_COUNT + 1,
        "block range must stay inside the save's block area"
    );

    if block_budget == 0 {
        return Err(CompressError::BlockBudgetExceeded);
    }

    let data = image.as_bytes();
    let write_start = sink.stream_position()?;
    let mut sink = Counted::new(sink);

    let mut record = [0u8; 3];
    let mut position = 0;
    let mut current_block = block_offset;
    let mut blocks_used: u8 = 1;
    let mut current_block_size = 0;

    while position < data.len() {
        let (step, consumed) = scan_step(data, position);
        let record_len = encode_step(step, &mut record);

        // Every record must leave room for a two-byte jump; seal the block
        // and continue in the next one if this record would not.
        if current_block_size + record_len + 2 > BLOCK_SIZE {
            let jump_len = encode_step(
                Step::Jump {
                    block: current_block + 1,
                },
                &mut record,
            );
            sink.write_all(&record[..jump_len])?;
            sink.write_repeat(&[0], BLOCK_SIZE - current_block_size - jump_len)?;

            if blocks_used == block_budget {
                let written = sink.bytes_written();
                sink.seek(SeekFrom::Start(write_start))?;
                sink.write_repeat(&[0], written as usize)?;
                sink.seek(SeekFrom::Start(write_start))?;
                return Err(CompressError::BlockBudgetExceeded);
            }

            current_block += 1;
            blocks_used += 1;
            current_block_size = 0;
            // Re-encode: `record` was clobbered by the jump.
            encode_step(step, &mut record);
        }

        sink.write_all(&record[..record_len])?;
        current_block_size += record_len;
        position += consumed;
    }

    ma::debug_assert_le!(current_block_size + 2, BLOCK_SIZE);
    let end_len = encode_step(Step::End, &mut record);
    sink.write_all(&record[..end_len])?;
    sink.write_repeat(&[0], BLOCK_SIZE - current_block_size - end_len)?;

    debug!(
        blocks_used,
        bytes_written = sink.bytes_written(),
        "compressed song image"
    );
    Ok(blocks_used)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;

    fn image_with_prefix(prefix: &[u8]) -> SongImage {
        let mut bytes = vec![0u8; SONG_BYTE_COUNT];
        bytes[..prefix.len()].copy_from_slice(prefix);
        SongImage::from_bytes(&bytes).unwrap()
    }

    fn compress_to_vec(image: &SongImage) -> Vec<u8> {
        let mut sink = Cursor::new(Vec::new());
        compress(image, &mut sink, 1, BLOCK_COUNT as u8).unwrap();
        sink.into_inner()
    }

    fn decompress_all(compressed: &[u8]) -> SongImage {
        let mut reader = Cursor::new(compressed);
        decompress(&mut reader, 0, true).unwrap()
    }

    #[test]
    fn escape_bytes_are_never_run_length_encoded() {
        // A run of 0xC0s must come out as self-escapes, not as an RLE
        // record, no matter how long it is.
        let image = image_with_prefix(&[0xC0; 5]);
        let compressed = compress_to_vec(&image);
        assert_eq!(&compressed[..10], &[0xC0; 10]);
        // The zero tail is run-length encoded right after.
        assert_eq!(&compressed[10..13], &[0xC0, 0x00, 0xFF]);
        assert_eq!(decompress_all(&compressed), image);
    }

    #[test]
    fn special_action_escape_round_trips() {
        let image = image_with_prefix(&[0xE0, 0xE0, 0x41]);
        let compressed = compress_to_vec(&image);
        assert_eq!(&compressed[..5], &[0xE0, 0xE0, 0xE0, 0xE0, 0x41]);
        assert_eq!(decompress_all(&compressed), image);
    }

    #[test]
    fn default_wave_runs_become_stamp_records() {
        let mut prefix = Vec::new();
        for _ in 0..3 {
            prefix.extend_from_slice(&DEFAULT_WAVE);
        }
        let image = image_with_prefix(&prefix);
        let compressed = compress_to_vec(&image);
        assert_eq!(&compressed[..3], &hex::decode("e0f003").unwrap()[..]);
        assert_eq!(&compressed[3..6], &[0xC0, 0x00, 0xFF]);
        assert_eq!(decompress_all(&compressed), image);
    }

    #[test]
    fn default_instrument_runs_become_stamp_records() {
        let mut prefix = Vec::new();
        for _ in 0..2 {
            prefix.extend_from_slice(&DEFAULT_INSTRUMENT);
        }
        let image = image_with_prefix(&prefix);
        let compressed = compress_to_vec(&image);
        assert_eq!(&compressed[..3], &hex::decode("e0f102").unwrap()[..]);
        assert_eq!(decompress_all(&compressed), image);
    }

    #[test]
    fn short_runs_stay_literal() {
        let image = image_with_prefix(&[0x41, 0x41, 0x41, 0x42]);
        let compressed = compress_to_vec(&image);
        assert_eq!(&compressed[..4], &[0x41, 0x41, 0x41, 0x42]);
    }

    #[test]
    fn four_byte_runs_are_encoded() {
        let image = image_with_prefix(&[0x41, 0x41, 0x41, 0x41, 0x42]);
        let compressed = compress_to_vec(&image);
        assert_eq!(&compressed[..5], &[0xC0, 0x41, 0x04, 0x42, 0xC0]);
    }

    #[test]
    fn full_blocks_chain_through_jump_records() {
        // 600 incompressible bytes overflow the first block's 510 payload
        // bytes, forcing a jump into block 2.
        let prefix: Vec<u8> = (0..600).map(|i| (i % 4) as u8 + 1).collect();
        let image = image_with_prefix(&prefix);
        let compressed = compress_to_vec(&image);
        assert_eq!(compressed.len() % BLOCK_SIZE, 0);
        assert_eq!(&compressed[510..512], &[0xE0, 0x02]);
        // Block 2 picks up exactly where the image left off.
        assert_eq!(compressed[512], prefix[510]);
        assert_eq!(decompress_all(&compressed), image);
    }

    #[test]
    fn last_block_ends_with_terminator_and_padding() {
        let image = image_with_prefix(&[]);
        let compressed = compress_to_vec(&image);
        assert_eq!(compressed.len(), BLOCK_SIZE);
        // 129 zero runs, then the terminator, then padding.
        let terminator = 129 * 3;
        assert_eq!(&compressed[terminator..terminator + 2], &[0xE0, 0xFF]);
        assert!(compressed[terminator + 2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn budget_overflow_rolls_the_sink_back() {
        let bytes: Vec<u8> = (0..SONG_BYTE_COUNT).map(|i| (i % 4) as u8 + 1).collect();
        let image = SongImage::from_bytes(&bytes).unwrap();
        let mut sink = Cursor::new(vec![0xAAu8; 4 * BLOCK_SIZE]);
        match compress(&image, &mut sink, 1, 3) {
            Err(CompressError::BlockBudgetExceeded) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(sink.position(), 0);
        let buf = sink.into_inner();
        assert!(buf[..3 * BLOCK_SIZE].iter().all(|&b| b == 0));
        // Untouched past the rolled-back region.
        assert!(buf[3 * BLOCK_SIZE..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn zero_budget_fails_immediately() {
        let image = SongImage::new();
        let mut sink = Cursor::new(Vec::new());
        assert!(matches!(
            compress(&image, &mut sink, 1, 0),
            Err(CompressError::BlockBudgetExceeded)
        ));
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn decoder_rejects_overflowing_streams() {
        // 170 RLE records of 255 bytes each blow well past the image size.
        let mut block = Vec::new();
        for _ in 0..170 {
            block.extend_from_slice(&[0xC0, 0x00, 0xFF]);
        }
        block.resize(BLOCK_SIZE, 0);
        let mut reader = Cursor::new(block);
        assert!(matches!(
            decompress(&mut reader, 0, true),
            Err(DecompressError::OutputOverflow)
        ));
    }

    #[test]
    fn decoder_rejects_short_streams() {
        let mut block = vec![0u8; BLOCK_SIZE];
        block[0] = 0xE0;
        block[1] = 0xFF;
        let mut reader = Cursor::new(block);
        assert!(matches!(
            decompress(&mut reader, 0, true),
            Err(DecompressError::ShortOutput { size: 0 })
        ));
    }

    #[test]
    fn decoder_rejects_truncated_streams() {
        let mut reader = Cursor::new(vec![0x41, 0x41]);
        assert!(matches!(
            decompress(&mut reader, 0, true),
            Err(DecompressError::TruncatedInput)
        ));
    }

    #[test]
    fn decoder_rejects_out_of_range_jumps() {
        let mut block = vec![0u8; BLOCK_SIZE];
        block[0] = 0xE0;
        block[1] = 0xC5; // block 197 of 191
        let mut reader = Cursor::new(block);
        assert!(matches!(
            decompress(&mut reader, 0, true),
            Err(DecompressError::BadJump { target: 0xC5 })
        ));
    }

    #[test]
    fn decoder_rejects_jump_loops() {
        let mut blocks = vec![0u8; 2 * BLOCK_SIZE];
        blocks[0] = 0xE0;
        blocks[1] = 0x02;
        blocks[BLOCK_SIZE] = 0xE0;
        blocks[BLOCK_SIZE + 1] = 0x01; // back to block 1
        let mut reader = Cursor::new(blocks);
        assert!(matches!(
            decompress(&mut reader, 0, true),
            Err(DecompressError::BadJump { target: 0x01 })
        ));
    }

    #[test]
    fn reader_is_block_aligned_after_decoding() {
        let image = SongImage::new();
        let compressed = compress_to_vec(&image);
        let blocks = compressed.len() / BLOCK_SIZE;
        let mut reader = Cursor::new(compressed);
        decompress(&mut reader, 0, true).unwrap();
        assert_eq!(reader.position() as usize, blocks * BLOCK_SIZE);
    }

    #[test]
    fn contiguous_streams_decode_without_following_jumps() {
        // A fresh song spans multiple blocks; laid out back-to-back its
        // jump records are only block-boundary markers.
        let image = SongImage::new();
        let compressed = compress_to_vec(&image);
        assert!(compressed.len() > BLOCK_SIZE);
        let mut reader = Cursor::new(compressed);
        let decoded = decompress(&mut reader, 0, false).unwrap();
        assert_eq!(decoded, image);
    }

    // Images assembled from segments that deliberately poke at every record
    // type: raw literals, long runs, dictionary patterns and escape bytes.
    fn image_strategy() -> impl Strategy<Value = SongImage> {
        let segment = prop_oneof![
            prop::collection::vec(any::<u8>(), 1..48),
            (any::<u8>(), 4..600usize).prop_map(|(value, len)| vec![value; len]),
            (1..4u8).prop_map(|n| DEFAULT_WAVE.repeat(n as usize)),
            (1..4u8).prop_map(|n| DEFAULT_INSTRUMENT.repeat(n as usize)),
            (1..8usize).prop_map(|n| vec![0xC0; n]),
            (1..8usize).prop_map(|n| vec![0xE0; n]),
        ];
        prop::collection::vec(segment, 0..96).prop_map(|segments| {
            let mut bytes: Vec<u8> = segments.into_iter().flatten().collect();
            bytes.resize(SONG_BYTE_COUNT, 0);
            SongImage::from_bytes(&bytes).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn round_trips_and_stays_block_sized(image in image_strategy()) {
            let mut sink = Cursor::new(Vec::new());
            let blocks_used = compress(&image, &mut sink, 1, BLOCK_COUNT as u8).unwrap();
            let compressed = sink.into_inner();
            prop_assert_eq!(compressed.len(), blocks_used as usize * BLOCK_SIZE);

            let mut reader = Cursor::new(compressed);
            let decoded = decompress(&mut reader, 0, true).unwrap();
            prop_assert_eq!(decoded.as_bytes(), image.as_bytes());
        }
    }
}
