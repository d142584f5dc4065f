//! The save container: working song, header, block-allocation table and the
//! 191-block area holding every compressed project.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{ReadBytesExt, WriteBytesExt};
use tracing::{debug, instrument, warn};

use crate::compression::{self, CompressError, DecompressError, BLOCK_COUNT, BLOCK_SIZE};
use crate::project::{Project, PROJECT_NAME_LENGTH};
use crate::song::{SongImage, SongImageError, SONG_BYTE_COUNT};

/// The number of project slots in a save.
pub const PROJECT_COUNT: usize = 32;

/// The canonical size of a save file.
pub const SAV_SIZE: usize = 0x20000;

const NAME_TABLE_OFFSET: u64 = 0x8000;
const INIT_MAGIC_OFFSET: u64 = 0x813E;
const ACTIVE_PROJECT_OFFSET: u64 = 0x8140;
const ALLOC_TABLE_OFFSET: u64 = 0x8141;
const BLOCK_AREA_OFFSET: u64 = 0x8200;

const HEADER_PAD: usize = 0x1E;
const INIT_MAGIC: [u8; 2] = *b"jk";

/// An unallocated entry in the block-allocation table.
const FREE_BLOCK: u8 = 0xFF;

/// Errors reading or writing a whole save.
#[derive(Debug, thiserror::Error)]
pub enum SavError {
    #[error("SRAM initialisation check at {INIT_MAGIC_OFFSET:#07x} wasn't 'jk'")]
    NotASav,

    #[error("the projects do not fit in {BLOCK_COUNT} blocks (slot {slot} overflowed)")]
    Overflow { slot: u8 },

    #[error("could not access save data")]
    Io(#[from] io::Error),
}

/// Why one project slot could not be loaded. Slots fail independently;
/// the rest of the save still loads.
#[derive(Debug, thiserror::Error)]
pub enum ProjectReadError {
    #[error(transparent)]
    Decompress(#[from] DecompressError),

    #[error(transparent)]
    Song(#[from] SongImageError),
}

/// A project slot the reader had to skip, and why.
#[derive(Debug)]
pub struct ReadDiagnostic {
    pub slot: u8,
    pub error: ProjectReadError,
}

/// Where a save sits in its lifecycle. Any state may be written out;
/// the tag exists so callers can tell unsaved mutations apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavState {
    /// Created in memory, never backed by a byte source.
    Empty,
    /// Parsed from a byte source and not mutated since.
    Loaded,
    /// Mutated since it was created or parsed.
    Dirty,
}

/// An entire save: the working song plus up to 32 named, compressed
/// projects.
pub struct Sav {
    working_song: SongImage,
    active_project: u8,
    projects: [Project; PROJECT_COUNT],
    state: SavState,
}

impl Sav {
    /// A save with a fresh working song and no projects.
    pub fn new() -> Sav {
        Sav {
            working_song: SongImage::new(),
            active_project: 0,
            projects: Default::default(),
            state: SavState::Empty,
        }
    }

    pub fn state(&self) -> SavState {
        self.state
    }

    pub fn working_song(&self) -> &SongImage {
        &self.working_song
    }

    pub fn working_song_mut(&mut self) -> &mut SongImage {
        self.state = SavState::Dirty;
        &mut self.working_song
    }

    pub fn set_working_song(&mut self, song: SongImage) {
        self.state = SavState::Dirty;
        self.working_song = song;
    }

    /// The slot index of the project currently loaded as the working song.
    pub fn active_project(&self) -> u8 {
        self.active_project
    }

    pub fn set_active_project(&mut self, slot: u8) {
        self.state = SavState::Dirty;
        self.active_project = slot;
    }

    pub fn project(&self, slot: usize) -> &Project {
        &self.projects[slot]
    }

    pub fn project_mut(&mut self, slot: usize) -> &mut Project {
        self.state = SavState::Dirty;
        &mut self.projects[slot]
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    /// Parse a save from a byte source.
    ///
    /// Slots whose chains cannot be decompressed, or whose images fail the
    /// "rb" check, come back empty; each one is reported in the returned
    /// diagnostics. The working song is taken as opaque bytes; validate it
    /// with [`SongImage::check_magic`] if you need to.
    #[instrument(skip(source), err)]
    pub fn read<R: Read + Seek>(source: &mut R) -> Result<(Sav, Vec<ReadDiagnostic>), SavError> {
        source.seek(SeekFrom::Start(INIT_MAGIC_OFFSET))?;
        let mut magic = [0u8; 2];
        source.read_exact(&mut magic)?;
        if magic != INIT_MAGIC {
            return Err(SavError::NotASav);
        }

        let mut sav = Sav::new();

        source.seek(SeekFrom::Start(NAME_TABLE_OFFSET))?;
        for slot in 0..PROJECT_COUNT {
            let mut name = [0u8; PROJECT_NAME_LENGTH];
            source.read_exact(&mut name)?;
            sav.projects[slot].set_name(&name);
        }
        for slot in 0..PROJECT_COUNT {
            let version = source.read_u8()?;
            sav.projects[slot].set_version(version);
        }

        source.seek(SeekFrom::Start(ACTIVE_PROJECT_OFFSET))?;
        sav.active_project = source.read_u8()?;

        let mut alloc_table = [FREE_BLOCK; BLOCK_COUNT];
        source.seek(SeekFrom::Start(ALLOC_TABLE_OFFSET))?;
        source.read_exact(&mut alloc_table)?;

        // Pull the whole block area into memory. Short device dumps leave
        // the tail zero-filled; any project chained into it fails its own
        // decode below and is reported, the rest of the save still loads.
        let mut blocks = vec![0u8; BLOCK_COUNT * BLOCK_SIZE];
        source.seek(SeekFrom::Start(BLOCK_AREA_OFFSET))?;
        let available = read_available(source, &mut blocks)?;
        if available < blocks.len() {
            warn!(
                available,
                expected = blocks.len(),
                "block area is truncated; reading what is there"
            );
        }

        let mut diagnostics = Vec::new();
        for slot in 0..PROJECT_COUNT {
            // A project's chain starts at the lowest block it owns.
            let Some(first_block) = (1..=BLOCK_COUNT)
                .find(|&block| alloc_table[block - 1] == slot as u8)
            else {
                continue;
            };

            let mut reader = Cursor::new(blocks.as_slice());
            reader.set_position(((first_block - 1) * BLOCK_SIZE) as u64);
            match read_project_song(&mut reader) {
                Ok(song) => sav.projects[slot].set_song(Some(song)),
                Err(error) => {
                    warn!(slot, %error, "skipping unreadable project");
                    diagnostics.push(ReadDiagnostic {
                        slot: slot as u8,
                        error,
                    });
                }
            }
        }

        source.seek(SeekFrom::Start(0))?;
        let mut working = vec![0u8; SONG_BYTE_COUNT];
        source.read_exact(&mut working)?;
        sav.working_song = SongImage::from_bytes(&working).expect("buffer is exactly one image");

        sav.state = SavState::Loaded;
        debug!(
            projects = sav.projects.iter().filter(|p| p.is_populated()).count(),
            skipped = diagnostics.len(),
            "parsed save"
        );
        Ok((sav, diagnostics))
    }

    /// Parse a save from an in-memory byte slice.
    pub fn read_from_memory(data: &[u8]) -> Result<(Sav, Vec<ReadDiagnostic>), SavError> {
        Sav::read(&mut Cursor::new(data))
    }

    /// Parse a save from a file.
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<(Sav, Vec<ReadDiagnostic>), SavError> {
        let mut file = File::open(path)?;
        Sav::read(&mut file)
    }

    /// Serialise the save.
    ///
    /// Every project is compressed into an in-memory block area first; only
    /// when all of them fit does anything reach `sink`. A save whose
    /// projects need more than 191 blocks fails with [`SavError::Overflow`]
    /// naming the first slot that did not fit.
    #[instrument(skip(self, sink), err)]
    pub fn write<W: Write + Seek>(&self, sink: &mut W) -> Result<(), SavError> {
        let mut alloc_table = [FREE_BLOCK; BLOCK_COUNT];
        let mut blocks = vec![0u8; BLOCK_COUNT * BLOCK_SIZE];
        let mut cursor = Cursor::new(blocks.as_mut_slice());
        let mut current_block: u8 = 1;

        for (slot, project) in self.projects.iter().enumerate() {
            let Some(song) = project.song() else { continue };
            let budget = BLOCK_COUNT as u8 - (current_block - 1);
            match compression::compress(song, &mut cursor, current_block, budget) {
                Ok(used) => {
                    for block in current_block..current_block + used {
                        alloc_table[(block - 1) as usize] = slot as u8;
                    }
                    current_block += used;
                }
                Err(CompressError::BlockBudgetExceeded) => {
                    return Err(SavError::Overflow { slot: slot as u8 });
                }
                Err(CompressError::Io(e)) => return Err(e.into()),
            }
        }
        debug!(
            blocks_used = current_block - 1,
            "compressed all projects into the block area"
        );

        sink.write_all(self.working_song.as_bytes())?;
        for project in &self.projects {
            sink.write_all(project.name())?;
        }
        for project in &self.projects {
            sink.write_u8(project.version())?;
        }
        sink.write_all(&[0u8; HEADER_PAD])?;
        sink.write_all(&INIT_MAGIC)?;
        sink.write_u8(self.active_project)?;
        sink.write_all(&alloc_table)?;
        sink.write_all(&blocks)?;
        Ok(())
    }

    /// Serialise the save into a fresh byte vector of [`SAV_SIZE`] bytes.
    pub fn write_to_memory(&self) -> Result<Vec<u8>, SavError> {
        let mut cursor = Cursor::new(Vec::with_capacity(SAV_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Serialise the save to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SavError> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }
}

impl Default for Sav {
    fn default() -> Self {
        Sav::new()
    }
}

/// Structural equality over working song, active project and the project
/// slots; the lifecycle state tag does not participate.
impl PartialEq for Sav {
    fn eq(&self, other: &Self) -> bool {
        self.working_song == other.working_song
            && self.active_project == other.active_project
            && self.projects == other.projects
    }
}

impl Eq for Sav {}

impl std::fmt::Debug for Sav {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sav")
            .field("active_project", &self.active_project)
            .field(
                "populated_slots",
                &self.projects.iter().filter(|p| p.is_populated()).count(),
            )
            .field("state", &self.state)
            .finish()
    }
}

fn read_project_song<R: Read + Seek>(reader: &mut R) -> Result<SongImage, ProjectReadError> {
    let song = compression::decompress(reader, 0, true)?;
    song.check_magic()?;
    Ok(song)
}

/// Fill as much of `buf` as the source still has, reporting how far it got.
/// Unlike `read_exact` this does not fail on a short source.
fn read_available<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
