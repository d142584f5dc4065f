//! Read, write and manipulate LSDj save files.
//!
//! A save holds the working song as a raw 32 KiB image, plus up to 32 named
//! projects compressed into 512-byte blocks. The [`compression`] module
//! implements the block codec, [`sav`] the on-disk container around it, and
//! [`song`] typed byte accessors over a decompressed song image.
//!
//! Everything reads from and writes to plain `std::io` streams, so saves can
//! live in files or in memory buffers alike.

pub mod compression;
pub mod project;
pub mod sav;
pub mod song;
pub mod vio;

pub use compression::{
    compress, decompress, CompressError, DecompressError, BLOCK_COUNT, BLOCK_SIZE,
};
pub use project::{Project, ProjectIoError, PROJECT_NAME_LENGTH};
pub use sav::{
    ProjectReadError, ReadDiagnostic, Sav, SavError, SavState, PROJECT_COUNT, SAV_SIZE,
};
pub use song::{Command, SongImage, SongImageError, SONG_BYTE_COUNT};

#[cfg(test)]
mod tests;
