//! A project: a named slot in a save that may hold a compressed song.

use std::borrow::Cow;
use std::io::{self, Read, Seek, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::compression::{self, CompressError, DecompressError, BLOCK_COUNT};
use crate::song::SongImage;

/// The number of bytes in a project name. Shorter names are zero-padded;
/// the name is raw bytes and nothing guarantees NUL termination.
pub const PROJECT_NAME_LENGTH: usize = 8;

/// Errors from the standalone single-project format.
#[derive(Debug, thiserror::Error)]
pub enum ProjectIoError {
    #[error("the project holds no song")]
    NoSong,

    #[error("could not decompress the project's song")]
    Decompress(#[from] DecompressError),

    #[error("could not compress the project's song")]
    Compress(#[from] CompressError),

    #[error("could not access project data")]
    Io(#[from] io::Error),
}

/// One of the 32 project slots of a save, or a standalone project file.
///
/// A project owns its song image; moving a project in or out of a save
/// moves the image with it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Project {
    name: [u8; PROJECT_NAME_LENGTH],
    version: u8,
    song: Option<SongImage>,
}

impl Project {
    /// An empty project: zero name, version 0, no song.
    pub fn new() -> Project {
        Project::default()
    }

    pub fn name(&self) -> &[u8; PROJECT_NAME_LENGTH] {
        &self.name
    }

    /// The name as text, stopping at the first NUL. Display helper only;
    /// the stored name stays raw bytes.
    pub fn name_str(&self) -> Cow<'_, str> {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PROJECT_NAME_LENGTH);
        String::from_utf8_lossy(&self.name[..len])
    }

    /// Set the name from up to eight raw bytes; the rest is zero-padded.
    /// Longer input is truncated.
    pub fn set_name(&mut self, name: &[u8]) {
        let len = name.len().min(PROJECT_NAME_LENGTH);
        self.name = [0; PROJECT_NAME_LENGTH];
        self.name[..len].copy_from_slice(&name[..len]);
    }

    /// The save counter; the tracker bumps it every time the project is
    /// saved on the device.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    pub fn song(&self) -> Option<&SongImage> {
        self.song.as_ref()
    }

    pub fn song_mut(&mut self) -> Option<&mut SongImage> {
        self.song.as_mut()
    }

    pub fn set_song(&mut self, song: Option<SongImage>) {
        self.song = song;
    }

    pub fn take_song(&mut self) -> Option<SongImage> {
        self.song.take()
    }

    /// Whether this slot holds a song.
    pub fn is_populated(&self) -> bool {
        self.song.is_some()
    }

    /// Read a standalone project file: eight name bytes, a version byte,
    /// then the compressed song blocks laid out back to back.
    pub fn read_lsdsng<R: Read + Seek>(source: &mut R) -> Result<Project, ProjectIoError> {
        let mut name = [0u8; PROJECT_NAME_LENGTH];
        source.read_exact(&mut name)?;
        let version = source.read_u8()?;

        // Blocks are contiguous here, so the jump records only mark block
        // boundaries and the block area starts right after the header.
        let first_block_offset = source.stream_position()?;
        let song = compression::decompress(source, first_block_offset, false)?;

        Ok(Project {
            name,
            version,
            song: Some(song),
        })
    }

    /// Write this project as a standalone file. Fails with
    /// [`ProjectIoError::NoSong`] on an empty project.
    pub fn write_lsdsng<W: Write + Seek>(&self, sink: &mut W) -> Result<(), ProjectIoError> {
        let song = self.song.as_ref().ok_or(ProjectIoError::NoSong)?;
        sink.write_all(&self.name)?;
        sink.write_u8(self.version)?;
        compression::compress(song, sink, 1, BLOCK_COUNT as u8)?;
        Ok(())
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name_str())
            .field("version", &self.version)
            .field("populated", &self.is_populated())
            .finish()
    }
}
