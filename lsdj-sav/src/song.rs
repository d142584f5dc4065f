//! The decompressed song image: a fixed 32 KiB byte buffer with typed
//! accessors over its documented offsets.
//!
//! The image is bank-oriented (four 8 KiB banks) and is exactly what sits in
//! the handheld's save RAM while a song is being edited. Nothing here parses
//! the song into a richer model; every accessor is a plain byte operation at
//! a fixed offset, and the block codec treats the whole buffer as opaque.

use crate::compression::{DEFAULT_INSTRUMENT, DEFAULT_WAVE};

/// The size of a decompressed song image.
pub const SONG_BYTE_COUNT: usize = 0x8000;

pub const PHRASE_COUNT: usize = 0xFF;
pub const PHRASE_LENGTH: usize = 0x10;
pub const CHAIN_COUNT: usize = 0x80;
pub const CHAIN_LENGTH: usize = 0x10;
pub const INSTRUMENT_COUNT: usize = 0x40;
pub const INSTRUMENT_BYTE_COUNT: usize = 0x10;
pub const INSTRUMENT_NAME_LENGTH: usize = 5;
pub const TABLE_COUNT: usize = 0x20;
pub const TABLE_LENGTH: usize = 0x10;
pub const SYNTH_COUNT: usize = 0x10;
pub const SYNTH_BYTE_COUNT: usize = 0x10;
pub const WAVE_COUNT: usize = 0x100;
pub const WAVE_LENGTH: usize = 0x10;
pub const GROOVE_COUNT: usize = 0x20;
pub const GROOVE_LENGTH: usize = 0x10;
pub const WORD_COUNT: usize = 42;
pub const WORD_LENGTH: usize = 0x10;
pub const WORD_NAME_LENGTH: usize = 4;
pub const BOOKMARK_COUNT: usize = 0x40;
pub const ROW_COUNT: usize = 0x100;
pub const ROW_CHANNEL_COUNT: usize = 4;

/// Offsets of every region inside the image. The regions tile all four banks
/// exactly; the format-version byte is the image's final byte.
mod offsets {
    pub const PHRASE_NOTES: usize = 0x0000;
    pub const BOOKMARKS: usize = 0x0FF0;
    pub const GROOVES: usize = 0x1090;
    pub const ROWS: usize = 0x1290;
    pub const TABLE_VOLUMES: usize = 0x1690;
    pub const WORDS: usize = 0x1890;
    pub const WORD_NAMES: usize = 0x1DD0;
    pub const MAGIC_BANK0: usize = 0x1E78;
    pub const INSTRUMENT_NAMES: usize = 0x1E7A;
    pub const TABLE_ALLOCATIONS: usize = 0x2020;
    pub const INSTRUMENT_ALLOCATIONS: usize = 0x2040;
    pub const CHAIN_PHRASES: usize = 0x2080;
    pub const CHAIN_TRANSPOSITIONS: usize = 0x2880;
    pub const INSTRUMENT_PARAMS: usize = 0x3080;
    pub const TABLE_TRANSPOSITIONS: usize = 0x3480;
    pub const TABLE_COMMAND1: usize = 0x3680;
    pub const TABLE_COMMAND1_VALUES: usize = 0x3880;
    pub const TABLE_COMMAND2: usize = 0x3A80;
    pub const TABLE_COMMAND2_VALUES: usize = 0x3C80;
    pub const MAGIC_BANK1: usize = 0x3E80;
    pub const PHRASE_ALLOCATIONS: usize = 0x3E82;
    pub const CHAIN_ALLOCATIONS: usize = 0x3EA2;
    pub const SYNTH_PARAMS: usize = 0x3EB2;
    pub const WORK_HOURS: usize = 0x3FB2;
    pub const WORK_MINUTES: usize = 0x3FB3;
    pub const TEMPO: usize = 0x3FB4;
    pub const TRANSPOSITION: usize = 0x3FB5;
    pub const TOTAL_DAYS: usize = 0x3FB6;
    pub const TOTAL_HOURS: usize = 0x3FB7;
    pub const TOTAL_MINUTES: usize = 0x3FB8;
    pub const KEY_DELAY: usize = 0x3FBA;
    pub const KEY_REPEAT: usize = 0x3FBB;
    pub const FONT: usize = 0x3FBC;
    pub const SYNC: usize = 0x3FBD;
    pub const COLOR_SET: usize = 0x3FBE;
    pub const CLONE: usize = 0x3FC0;
    pub const FILE_CHANGED: usize = 0x3FC1;
    pub const POWER_SAVE: usize = 0x3FC2;
    pub const PRE_LISTEN: usize = 0x3FC3;
    pub const SYNTH_OVERWRITES: usize = 0x3FC4;
    pub const PHRASE_COMMANDS: usize = 0x4000;
    pub const PHRASE_COMMAND_VALUES: usize = 0x4FF0;
    pub const WAVE_FRAMES: usize = 0x6000;
    pub const PHRASE_INSTRUMENTS: usize = 0x7000;
    pub const MAGIC_BANK3: usize = 0x7FF0;
    pub const FORMAT_VERSION: usize = 0x7FFF;
}

/// The three places a valid image carries the "rb" memory flag.
pub const MAGIC_OFFSETS: [usize; 3] = [
    offsets::MAGIC_BANK0,
    offsets::MAGIC_BANK1,
    offsets::MAGIC_BANK3,
];

const MAGIC: [u8; 2] = *b"rb";

/// Format version at which the table command encoding gained the B command.
const COMMAND_B_VERSION: u8 = 8;

/// Errors working with song image bytes.
#[derive(Debug, thiserror::Error)]
pub enum SongImageError {
    #[error("song image must be {SONG_BYTE_COUNT} bytes, got {0}")]
    WrongLength(usize),

    #[error("memory flag 'rb' not found at {offset:#06x}")]
    MagicCheckFailed { offset: usize },

    #[error("command B requires format version {COMMAND_B_VERSION} or up")]
    UnsupportedCommand,

    #[error("unknown command byte {byte:#04x}")]
    UnknownCommand { byte: u8 },
}

/// An effect command in a table command column.
///
/// The discriminant is *not* the wire encoding; see [`Command::to_wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    K,
    L,
    M,
    O,
    P,
    R,
    S,
    T,
    V,
    W,
    Z,
    ArduinoBoyN,
    ArduinoBoyX,
    ArduinoBoyQ,
    ArduinoBoyY,
}

impl Command {
    // Wire values before format version 8, when B did not exist yet.
    fn pre8_wire(self) -> Option<u8> {
        use Command::*;
        Some(match self {
            None => 0,
            A => 1,
            B => return Option::None,
            C => 2,
            D => 3,
            E => 4,
            F => 5,
            G => 6,
            H => 7,
            K => 8,
            L => 9,
            M => 10,
            O => 11,
            P => 12,
            R => 13,
            S => 14,
            T => 15,
            V => 16,
            W => 17,
            Z => 18,
            ArduinoBoyN => 19,
            ArduinoBoyX => 20,
            ArduinoBoyQ => 21,
            ArduinoBoyY => 22,
        })
    }

    fn from_pre8_wire(byte: u8) -> Option<Command> {
        use Command::*;
        Some(match byte {
            0 => None,
            1 => A,
            2 => C,
            3 => D,
            4 => E,
            5 => F,
            6 => G,
            7 => H,
            8 => K,
            9 => L,
            10 => M,
            11 => O,
            12 => P,
            13 => R,
            14 => S,
            15 => T,
            16 => V,
            17 => W,
            18 => Z,
            19 => ArduinoBoyN,
            20 => ArduinoBoyX,
            21 => ArduinoBoyQ,
            22 => ArduinoBoyY,
            _ => return Option::None,
        })
    }

    /// The byte stored in the image for this command under the given format
    /// version. Version 8 inserted B at wire value 1, shifting every other
    /// command up by one; before that B is not representable.
    pub fn to_wire(self, version: u8) -> Result<u8, SongImageError> {
        if version >= COMMAND_B_VERSION {
            match self {
                Command::None => Ok(0),
                Command::B => Ok(1),
                other => Ok(other.pre8_wire().expect("every non-B command has a pre-8 wire value") + 1),
            }
        } else {
            self.pre8_wire().ok_or(SongImageError::UnsupportedCommand)
        }
    }

    /// Inverse of [`Command::to_wire`].
    pub fn from_wire(byte: u8, version: u8) -> Result<Command, SongImageError> {
        let command = if version >= COMMAND_B_VERSION {
            match byte {
                0 => Some(Command::None),
                1 => Some(Command::B),
                b => Command::from_pre8_wire(b - 1),
            }
        } else {
            Command::from_pre8_wire(byte)
        };
        command.ok_or(SongImageError::UnknownCommand { byte })
    }
}

/// One decompressed song, still in its raw in-memory representation.
#[derive(Clone, PartialEq, Eq)]
pub struct SongImage {
    bytes: Box<[u8; SONG_BYTE_COUNT]>,
}

impl SongImage {
    /// A fresh, empty song: the byte image the tracker itself produces right
    /// after initialising a new project.
    pub fn new() -> SongImage {
        let mut image = SongImage {
            bytes: Box::new([0; SONG_BYTE_COUNT]),
        };

        image.fill(offsets::BOOKMARKS, BOOKMARK_COUNT, 0xFF);
        image.fill(offsets::CHAIN_PHRASES, CHAIN_COUNT * CHAIN_LENGTH, 0xFF);
        image.fill(offsets::PHRASE_INSTRUMENTS, PHRASE_COUNT * PHRASE_LENGTH, 0xFF);

        for instrument in 0..INSTRUMENT_COUNT {
            image.set_instrument(instrument, &DEFAULT_INSTRUMENT);
        }
        for wave in 0..WAVE_COUNT {
            image.set_wave(wave, &DEFAULT_WAVE);
        }
        for (word, name) in default_word_names().enumerate() {
            image.set_word_name(word, &name);
        }

        image.set_tempo(128);
        image.set_key_delay(7);
        image.set_key_repeat(2);
        image.set_pre_listen(1);

        for offset in MAGIC_OFFSETS {
            image.bytes[offset..offset + 2].copy_from_slice(&MAGIC);
        }
        image.set_format_version(4);

        image
    }

    /// Wrap a full image. The bytes are taken as-is; use
    /// [`SongImage::check_magic`] to validate them.
    pub fn from_bytes(bytes: &[u8]) -> Result<SongImage, SongImageError> {
        let bytes: [u8; SONG_BYTE_COUNT] = bytes
            .try_into()
            .map_err(|_| SongImageError::WrongLength(bytes.len()))?;
        Ok(SongImage {
            bytes: Box::new(bytes),
        })
    }

    pub(crate) fn from_boxed(bytes: Box<[u8; SONG_BYTE_COUNT]>) -> SongImage {
        SongImage { bytes }
    }

    /// Verify the three "rb" memory flags a real song image always carries.
    pub fn check_magic(&self) -> Result<(), SongImageError> {
        for offset in MAGIC_OFFSETS {
            if self.bytes[offset..offset + 2] != MAGIC {
                return Err(SongImageError::MagicCheckFailed { offset });
            }
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8; SONG_BYTE_COUNT] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; SONG_BYTE_COUNT] {
        &mut self.bytes
    }

    fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.bytes[offset..offset + len].fill(value);
    }

    fn get_slot<const N: usize>(&self, offset: usize, slot: usize) -> [u8; N] {
        let start = offset + slot * N;
        self.bytes[start..start + N]
            .try_into()
            .expect("slot width matches region stride")
    }

    fn set_slot<const N: usize>(&mut self, offset: usize, slot: usize, data: &[u8; N]) {
        let start = offset + slot * N;
        self.bytes[start..start + N].copy_from_slice(data);
    }

    // --- song-wide settings ---

    pub fn format_version(&self) -> u8 {
        self.bytes[offsets::FORMAT_VERSION]
    }

    pub fn set_format_version(&mut self, version: u8) {
        self.bytes[offsets::FORMAT_VERSION] = version;
    }

    pub fn tempo(&self) -> u8 {
        self.bytes[offsets::TEMPO]
    }

    pub fn set_tempo(&mut self, tempo: u8) {
        self.bytes[offsets::TEMPO] = tempo;
    }

    pub fn transposition(&self) -> u8 {
        self.bytes[offsets::TRANSPOSITION]
    }

    pub fn set_transposition(&mut self, transposition: u8) {
        self.bytes[offsets::TRANSPOSITION] = transposition;
    }

    pub fn file_changed_flag(&self) -> u8 {
        self.bytes[offsets::FILE_CHANGED]
    }

    pub fn set_file_changed_flag(&mut self, flag: u8) {
        self.bytes[offsets::FILE_CHANGED] = flag;
    }

    pub fn key_delay(&self) -> u8 {
        self.bytes[offsets::KEY_DELAY]
    }

    pub fn set_key_delay(&mut self, value: u8) {
        self.bytes[offsets::KEY_DELAY] = value;
    }

    pub fn key_repeat(&self) -> u8 {
        self.bytes[offsets::KEY_REPEAT]
    }

    pub fn set_key_repeat(&mut self, value: u8) {
        self.bytes[offsets::KEY_REPEAT] = value;
    }

    pub fn font(&self) -> u8 {
        self.bytes[offsets::FONT]
    }

    pub fn set_font(&mut self, value: u8) {
        self.bytes[offsets::FONT] = value;
    }

    pub fn sync_setting(&self) -> u8 {
        self.bytes[offsets::SYNC]
    }

    pub fn set_sync_setting(&mut self, value: u8) {
        self.bytes[offsets::SYNC] = value;
    }

    pub fn color_set(&self) -> u8 {
        self.bytes[offsets::COLOR_SET]
    }

    pub fn set_color_set(&mut self, value: u8) {
        self.bytes[offsets::COLOR_SET] = value;
    }

    pub fn clone_mode(&self) -> u8 {
        self.bytes[offsets::CLONE]
    }

    pub fn set_clone_mode(&mut self, value: u8) {
        self.bytes[offsets::CLONE] = value;
    }

    pub fn power_save(&self) -> u8 {
        self.bytes[offsets::POWER_SAVE]
    }

    pub fn set_power_save(&mut self, value: u8) {
        self.bytes[offsets::POWER_SAVE] = value;
    }

    pub fn pre_listen(&self) -> u8 {
        self.bytes[offsets::PRE_LISTEN]
    }

    pub fn set_pre_listen(&mut self, value: u8) {
        self.bytes[offsets::PRE_LISTEN] = value;
    }

    /// Work time on this song as (hours, minutes).
    pub fn work_time(&self) -> (u8, u8) {
        (
            self.bytes[offsets::WORK_HOURS],
            self.bytes[offsets::WORK_MINUTES],
        )
    }

    pub fn set_work_time(&mut self, hours: u8, minutes: u8) {
        self.bytes[offsets::WORK_HOURS] = hours;
        self.bytes[offsets::WORK_MINUTES] = minutes;
    }

    /// Total time in the tracker as (days, hours, minutes).
    pub fn total_time(&self) -> (u8, u8, u8) {
        (
            self.bytes[offsets::TOTAL_DAYS],
            self.bytes[offsets::TOTAL_HOURS],
            self.bytes[offsets::TOTAL_MINUTES],
        )
    }

    pub fn set_total_time(&mut self, days: u8, hours: u8, minutes: u8) {
        self.bytes[offsets::TOTAL_DAYS] = days;
        self.bytes[offsets::TOTAL_HOURS] = hours;
        self.bytes[offsets::TOTAL_MINUTES] = minutes;
    }

    // --- rows, bookmarks, grooves ---

    /// The chain playing on each of the four channels in row `row`.
    pub fn row(&self, row: usize) -> [u8; ROW_CHANNEL_COUNT] {
        assert!(row < ROW_COUNT);
        self.get_slot(offsets::ROWS, row)
    }

    pub fn set_row(&mut self, row: usize, chains: &[u8; ROW_CHANNEL_COUNT]) {
        assert!(row < ROW_COUNT);
        self.set_slot(offsets::ROWS, row, chains);
    }

    pub fn bookmark(&self, bookmark: usize) -> u8 {
        assert!(bookmark < BOOKMARK_COUNT);
        self.bytes[offsets::BOOKMARKS + bookmark]
    }

    pub fn set_bookmark(&mut self, bookmark: usize, value: u8) {
        assert!(bookmark < BOOKMARK_COUNT);
        self.bytes[offsets::BOOKMARKS + bookmark] = value;
    }

    pub fn groove(&self, groove: usize) -> [u8; GROOVE_LENGTH] {
        assert!(groove < GROOVE_COUNT);
        self.get_slot(offsets::GROOVES, groove)
    }

    pub fn set_groove(&mut self, groove: usize, steps: &[u8; GROOVE_LENGTH]) {
        assert!(groove < GROOVE_COUNT);
        self.set_slot(offsets::GROOVES, groove, steps);
    }

    // --- chains ---

    pub fn chain_phrases(&self, chain: usize) -> [u8; CHAIN_LENGTH] {
        assert!(chain < CHAIN_COUNT);
        self.get_slot(offsets::CHAIN_PHRASES, chain)
    }

    pub fn set_chain_phrases(&mut self, chain: usize, phrases: &[u8; CHAIN_LENGTH]) {
        assert!(chain < CHAIN_COUNT);
        self.set_slot(offsets::CHAIN_PHRASES, chain, phrases);
    }

    pub fn chain_transpositions(&self, chain: usize) -> [u8; CHAIN_LENGTH] {
        assert!(chain < CHAIN_COUNT);
        self.get_slot(offsets::CHAIN_TRANSPOSITIONS, chain)
    }

    pub fn set_chain_transpositions(&mut self, chain: usize, transpositions: &[u8; CHAIN_LENGTH]) {
        assert!(chain < CHAIN_COUNT);
        self.set_slot(offsets::CHAIN_TRANSPOSITIONS, chain, transpositions);
    }

    // --- phrases ---

    pub fn phrase_notes(&self, phrase: usize) -> [u8; PHRASE_LENGTH] {
        assert!(phrase < PHRASE_COUNT);
        self.get_slot(offsets::PHRASE_NOTES, phrase)
    }

    pub fn set_phrase_notes(&mut self, phrase: usize, notes: &[u8; PHRASE_LENGTH]) {
        assert!(phrase < PHRASE_COUNT);
        self.set_slot(offsets::PHRASE_NOTES, phrase, notes);
    }

    pub fn phrase_commands(&self, phrase: usize) -> [u8; PHRASE_LENGTH] {
        assert!(phrase < PHRASE_COUNT);
        self.get_slot(offsets::PHRASE_COMMANDS, phrase)
    }

    pub fn set_phrase_commands(&mut self, phrase: usize, commands: &[u8; PHRASE_LENGTH]) {
        assert!(phrase < PHRASE_COUNT);
        self.set_slot(offsets::PHRASE_COMMANDS, phrase, commands);
    }

    pub fn phrase_command_values(&self, phrase: usize) -> [u8; PHRASE_LENGTH] {
        assert!(phrase < PHRASE_COUNT);
        self.get_slot(offsets::PHRASE_COMMAND_VALUES, phrase)
    }

    pub fn set_phrase_command_values(&mut self, phrase: usize, values: &[u8; PHRASE_LENGTH]) {
        assert!(phrase < PHRASE_COUNT);
        self.set_slot(offsets::PHRASE_COMMAND_VALUES, phrase, values);
    }

    pub fn phrase_instruments(&self, phrase: usize) -> [u8; PHRASE_LENGTH] {
        assert!(phrase < PHRASE_COUNT);
        self.get_slot(offsets::PHRASE_INSTRUMENTS, phrase)
    }

    pub fn set_phrase_instruments(&mut self, phrase: usize, instruments: &[u8; PHRASE_LENGTH]) {
        assert!(phrase < PHRASE_COUNT);
        self.set_slot(offsets::PHRASE_INSTRUMENTS, phrase, instruments);
    }

    // --- instruments ---

    pub fn instrument(&self, instrument: usize) -> [u8; INSTRUMENT_BYTE_COUNT] {
        assert!(instrument < INSTRUMENT_COUNT);
        self.get_slot(offsets::INSTRUMENT_PARAMS, instrument)
    }

    pub fn set_instrument(&mut self, instrument: usize, params: &[u8; INSTRUMENT_BYTE_COUNT]) {
        assert!(instrument < INSTRUMENT_COUNT);
        self.set_slot(offsets::INSTRUMENT_PARAMS, instrument, params);
    }

    pub fn instrument_name(&self, instrument: usize) -> [u8; INSTRUMENT_NAME_LENGTH] {
        assert!(instrument < INSTRUMENT_COUNT);
        self.get_slot(offsets::INSTRUMENT_NAMES, instrument)
    }

    pub fn set_instrument_name(&mut self, instrument: usize, name: &[u8; INSTRUMENT_NAME_LENGTH]) {
        assert!(instrument < INSTRUMENT_COUNT);
        self.set_slot(offsets::INSTRUMENT_NAMES, instrument, name);
    }

    // --- tables ---

    pub fn table_volumes(&self, table: usize) -> [u8; TABLE_LENGTH] {
        assert!(table < TABLE_COUNT);
        self.get_slot(offsets::TABLE_VOLUMES, table)
    }

    pub fn set_table_volumes(&mut self, table: usize, volumes: &[u8; TABLE_LENGTH]) {
        assert!(table < TABLE_COUNT);
        self.set_slot(offsets::TABLE_VOLUMES, table, volumes);
    }

    pub fn table_transpositions(&self, table: usize) -> [u8; TABLE_LENGTH] {
        assert!(table < TABLE_COUNT);
        self.get_slot(offsets::TABLE_TRANSPOSITIONS, table)
    }

    pub fn set_table_transpositions(&mut self, table: usize, transpositions: &[u8; TABLE_LENGTH]) {
        assert!(table < TABLE_COUNT);
        self.set_slot(offsets::TABLE_TRANSPOSITIONS, table, transpositions);
    }

    /// First command column of a table step, decoded for this image's format
    /// version. This is the one accessor pair where the wire encoding depends
    /// on the version byte; the codec itself never branches on it.
    pub fn table_command1(&self, table: usize, step: usize) -> Result<Command, SongImageError> {
        Command::from_wire(
            self.table_step(offsets::TABLE_COMMAND1, table, step),
            self.format_version(),
        )
    }

    pub fn set_table_command1(
        &mut self,
        table: usize,
        step: usize,
        command: Command,
    ) -> Result<(), SongImageError> {
        let byte = command.to_wire(self.format_version())?;
        self.set_table_step(offsets::TABLE_COMMAND1, table, step, byte);
        Ok(())
    }

    pub fn table_command1_value(&self, table: usize, step: usize) -> u8 {
        self.table_step(offsets::TABLE_COMMAND1_VALUES, table, step)
    }

    pub fn set_table_command1_value(&mut self, table: usize, step: usize, value: u8) {
        self.set_table_step(offsets::TABLE_COMMAND1_VALUES, table, step, value);
    }

    pub fn table_command2(&self, table: usize, step: usize) -> Result<Command, SongImageError> {
        Command::from_wire(
            self.table_step(offsets::TABLE_COMMAND2, table, step),
            self.format_version(),
        )
    }

    pub fn set_table_command2(
        &mut self,
        table: usize,
        step: usize,
        command: Command,
    ) -> Result<(), SongImageError> {
        let byte = command.to_wire(self.format_version())?;
        self.set_table_step(offsets::TABLE_COMMAND2, table, step, byte);
        Ok(())
    }

    pub fn table_command2_value(&self, table: usize, step: usize) -> u8 {
        self.table_step(offsets::TABLE_COMMAND2_VALUES, table, step)
    }

    pub fn set_table_command2_value(&mut self, table: usize, step: usize, value: u8) {
        self.set_table_step(offsets::TABLE_COMMAND2_VALUES, table, step, value);
    }

    fn table_step(&self, offset: usize, table: usize, step: usize) -> u8 {
        assert!(table < TABLE_COUNT && step < TABLE_LENGTH);
        self.bytes[offset + table * TABLE_LENGTH + step]
    }

    fn set_table_step(&mut self, offset: usize, table: usize, step: usize, value: u8) {
        assert!(table < TABLE_COUNT && step < TABLE_LENGTH);
        self.bytes[offset + table * TABLE_LENGTH + step] = value;
    }

    // --- synths and waves ---

    pub fn synth_params(&self, synth: usize) -> [u8; SYNTH_BYTE_COUNT] {
        assert!(synth < SYNTH_COUNT);
        self.get_slot(offsets::SYNTH_PARAMS, synth)
    }

    pub fn set_synth_params(&mut self, synth: usize, params: &[u8; SYNTH_BYTE_COUNT]) {
        assert!(synth < SYNTH_COUNT);
        self.set_slot(offsets::SYNTH_PARAMS, synth, params);
    }

    /// Whether the wave frames of `synth` have been overwritten by hand since
    /// the synth last rendered them.
    pub fn synth_overwritten(&self, synth: usize) -> bool {
        assert!(synth < SYNTH_COUNT);
        let byte = self.bytes[offsets::SYNTH_OVERWRITES + 1 - synth / 8];
        (byte >> (synth % 8)) & 1 == 1
    }

    pub fn set_synth_overwritten(&mut self, synth: usize, overwritten: bool) {
        assert!(synth < SYNTH_COUNT);
        let byte = &mut self.bytes[offsets::SYNTH_OVERWRITES + 1 - synth / 8];
        if overwritten {
            *byte |= 1 << (synth % 8);
        } else {
            *byte &= !(1 << (synth % 8));
        }
    }

    pub fn wave(&self, wave: usize) -> [u8; WAVE_LENGTH] {
        assert!(wave < WAVE_COUNT);
        self.get_slot(offsets::WAVE_FRAMES, wave)
    }

    pub fn set_wave(&mut self, wave: usize, frame: &[u8; WAVE_LENGTH]) {
        assert!(wave < WAVE_COUNT);
        self.set_slot(offsets::WAVE_FRAMES, wave, frame);
    }

    // --- speech words ---

    pub fn word_allophones(&self, word: usize) -> [u8; WORD_LENGTH] {
        assert!(word < WORD_COUNT);
        self.get_slot::<{ WORD_LENGTH }>(offsets::WORDS, word * 2)
    }

    pub fn set_word_allophones(&mut self, word: usize, allophones: &[u8; WORD_LENGTH]) {
        assert!(word < WORD_COUNT);
        self.set_slot::<{ WORD_LENGTH }>(offsets::WORDS, word * 2, allophones);
    }

    pub fn word_lengths(&self, word: usize) -> [u8; WORD_LENGTH] {
        assert!(word < WORD_COUNT);
        self.get_slot::<{ WORD_LENGTH }>(offsets::WORDS, word * 2 + 1)
    }

    pub fn set_word_lengths(&mut self, word: usize, lengths: &[u8; WORD_LENGTH]) {
        assert!(word < WORD_COUNT);
        self.set_slot::<{ WORD_LENGTH }>(offsets::WORDS, word * 2 + 1, lengths);
    }

    pub fn word_name(&self, word: usize) -> [u8; WORD_NAME_LENGTH] {
        assert!(word < WORD_COUNT);
        self.get_slot(offsets::WORD_NAMES, word)
    }

    pub fn set_word_name(&mut self, word: usize, name: &[u8; WORD_NAME_LENGTH]) {
        assert!(word < WORD_COUNT);
        self.set_slot(offsets::WORD_NAMES, word, name);
    }

    // --- allocation tables ---

    pub fn table_allocated(&self, table: usize) -> bool {
        assert!(table < TABLE_COUNT);
        self.bytes[offsets::TABLE_ALLOCATIONS + table] != 0
    }

    pub fn set_table_allocated(&mut self, table: usize, allocated: bool) {
        assert!(table < TABLE_COUNT);
        self.bytes[offsets::TABLE_ALLOCATIONS + table] = allocated as u8;
    }

    pub fn instrument_allocated(&self, instrument: usize) -> bool {
        assert!(instrument < INSTRUMENT_COUNT);
        self.bytes[offsets::INSTRUMENT_ALLOCATIONS + instrument] != 0
    }

    pub fn set_instrument_allocated(&mut self, instrument: usize, allocated: bool) {
        assert!(instrument < INSTRUMENT_COUNT);
        self.bytes[offsets::INSTRUMENT_ALLOCATIONS + instrument] = allocated as u8;
    }

    pub fn chain_allocated(&self, chain: usize) -> bool {
        assert!(chain < CHAIN_COUNT);
        (self.bytes[offsets::CHAIN_ALLOCATIONS + chain / 8] >> (chain % 8)) & 1 == 1
    }

    pub fn set_chain_allocated(&mut self, chain: usize, allocated: bool) {
        assert!(chain < CHAIN_COUNT);
        let byte = &mut self.bytes[offsets::CHAIN_ALLOCATIONS + chain / 8];
        if allocated {
            *byte |= 1 << (chain % 8);
        } else {
            *byte &= !(1 << (chain % 8));
        }
    }

    pub fn phrase_allocated(&self, phrase: usize) -> bool {
        assert!(phrase < PHRASE_COUNT);
        (self.bytes[offsets::PHRASE_ALLOCATIONS + phrase / 8] >> (phrase % 8)) & 1 == 1
    }

    pub fn set_phrase_allocated(&mut self, phrase: usize, allocated: bool) {
        assert!(phrase < PHRASE_COUNT);
        let byte = &mut self.bytes[offsets::PHRASE_ALLOCATIONS + phrase / 8];
        if allocated {
            *byte |= 1 << (phrase % 8);
        } else {
            *byte &= !(1 << (phrase % 8));
        }
    }
}

impl Default for SongImage {
    fn default() -> Self {
        SongImage::new()
    }
}

impl std::fmt::Debug for SongImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SongImage")
            .field("format_version", &self.format_version())
            .field("tempo", &self.tempo())
            .field("file_changed_flag", &self.file_changed_flag())
            .finish_non_exhaustive()
    }
}

/// The speech word names a fresh song starts with: the note names from C 2
/// up to F 5, sharps spelled as a repeat of the plain letter.
fn default_word_names() -> impl Iterator<Item = [u8; WORD_NAME_LENGTH]> {
    const LETTERS: &[u8; 12] = b"CCDDEFFGGAAB";
    (0..WORD_COUNT).map(|i| {
        let octave = b'2' + (i / 12) as u8;
        [LETTERS[i % 12], b' ', octave, b' ']
    })
}
