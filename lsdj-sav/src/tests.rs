//! Whole-save tests: container round-trips, partial reads and overflow.

use std::io::Cursor;

use crate::compression::{BLOCK_COUNT, BLOCK_SIZE};
use crate::project::ProjectIoError;
use crate::sav::{ProjectReadError, Sav, SavError, SavState, PROJECT_COUNT, SAV_SIZE};
use crate::song::{SongImage, SONG_BYTE_COUNT};
use crate::DecompressError;

fn patterned_song(seed: u8) -> SongImage {
    let mut song = SongImage::new();
    song.set_tempo(seed);
    for phrase in 0..16 {
        let mut notes = [0u8; 16];
        for (i, note) in notes.iter_mut().enumerate() {
            *note = seed.wrapping_add(i as u8).wrapping_mul(3);
        }
        song.set_phrase_notes(phrase, &notes);
    }
    song
}

/// A song whose bytes defeat every codec rule, so each block holds at most
/// 510 of them. Still carries its "rb" flags so it survives a read-back.
fn incompressible_song() -> SongImage {
    let bytes: Vec<u8> = (0..SONG_BYTE_COUNT).map(|i| (i % 4) as u8 + 1).collect();
    let mut song = SongImage::from_bytes(&bytes).unwrap();
    for offset in crate::song::MAGIC_OFFSETS {
        song.as_bytes_mut()[offset..offset + 2].copy_from_slice(b"rb");
    }
    song
}

#[test]
fn empty_sav_serialises_to_canonical_size() {
    let sav = Sav::new();
    assert_eq!(sav.state(), SavState::Empty);
    let bytes = sav.write_to_memory().unwrap();
    assert_eq!(bytes.len(), SAV_SIZE);
    assert_eq!(&bytes[0x813E..0x8140], b"jk");
    // No projects: the allocation table is all free markers.
    assert!(bytes[0x8141..0x8200].iter().all(|&b| b == 0xFF));

    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(read_back, sav);
    assert_eq!(read_back.state(), SavState::Loaded);
}

#[test]
fn sav_round_trips_with_multiple_projects() {
    let mut sav = Sav::new();
    sav.set_active_project(1);

    let slot0 = sav.project_mut(0);
    slot0.set_name(b"ALPHA");
    slot0.set_version(2);
    slot0.set_song(Some(patterned_song(0x21)));

    let slot1 = sav.project_mut(1);
    slot1.set_name(b"BRAVO");
    slot1.set_version(7);
    // A bulkier song than slot 0's, so the two chains differ in length.
    slot1.set_song(Some(incompressible_song()));

    assert_eq!(sav.state(), SavState::Dirty);

    let bytes = sav.write_to_memory().unwrap();
    assert_eq!(bytes.len(), SAV_SIZE);

    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(read_back.active_project(), 1);
    assert_eq!(read_back.project(0).name_str(), "ALPHA");
    assert_eq!(read_back.project(0).version(), 2);
    assert_eq!(read_back.project(1).name_str(), "BRAVO");
    assert_eq!(read_back.project(1).version(), 7);
    assert_eq!(
        read_back.project(0).song().unwrap().as_bytes(),
        sav.project(0).song().unwrap().as_bytes()
    );
    assert_eq!(
        read_back.project(1).song().unwrap().as_bytes(),
        sav.project(1).song().unwrap().as_bytes()
    );
    assert_eq!(read_back, sav);
}

#[test]
fn alloc_table_maps_blocks_to_owning_slots() {
    let mut sav = Sav::new();
    sav.project_mut(3).set_song(Some(incompressible_song()));
    sav.project_mut(5).set_song(Some(patterned_song(0x44)));

    let bytes = sav.write_to_memory().unwrap();
    let alloc = &bytes[0x8141..0x8200];
    // Slot 3 comes first and owns an unbroken run from block 1; slot 5's
    // chain follows immediately.
    let slot3_blocks = alloc.iter().filter(|&&b| b == 3).count();
    let slot5_blocks = alloc.iter().filter(|&&b| b == 5).count();
    assert_eq!(slot3_blocks, SONG_BYTE_COUNT.div_ceil(510));
    assert!(slot5_blocks > 0);
    assert!(alloc[..slot3_blocks].iter().all(|&b| b == 3));
    assert!(alloc[slot3_blocks..slot3_blocks + slot5_blocks]
        .iter()
        .all(|&b| b == 5));
    assert!(alloc[slot3_blocks + slot5_blocks..]
        .iter()
        .all(|&b| b == 0xFF));
}

#[test]
fn files_without_the_init_magic_are_rejected() {
    let bytes = vec![0u8; SAV_SIZE];
    assert!(matches!(
        Sav::read_from_memory(&bytes),
        Err(SavError::NotASav)
    ));

    // A corrupted copy of a real save is rejected the same way.
    let mut bytes = Sav::new().write_to_memory().unwrap();
    bytes[0x813F] = b'l';
    assert!(matches!(
        Sav::read_from_memory(&bytes),
        Err(SavError::NotASav)
    ));
}

#[test]
fn corrupt_projects_are_skipped_with_diagnostics() {
    let mut sav = Sav::new();
    sav.project_mut(0).set_song(Some(patterned_song(0x10)));
    sav.project_mut(1).set_song(Some(patterned_song(0x33)));
    let mut bytes = sav.write_to_memory().unwrap();

    // Break slot 0's chain: its first block now jumps out of range.
    bytes[0x8200] = 0xE0;
    bytes[0x8201] = 0xC5;

    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].slot, 0);
    assert!(matches!(
        diagnostics[0].error,
        ProjectReadError::Decompress(DecompressError::BadJump { target: 0xC5 })
    ));
    assert!(!read_back.project(0).is_populated());
    // The intact neighbour still loads, names and all.
    assert!(read_back.project(1).is_populated());
}

#[test]
fn decoded_songs_must_carry_their_memory_flags() {
    let mut sav = Sav::new();
    let mut song = patterned_song(0x55);
    song.as_bytes_mut()[0x7FF0] = 0; // clobber the bank-3 flag
    sav.project_mut(4).set_song(Some(song));
    let bytes = sav.write_to_memory().unwrap();

    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].slot, 4);
    assert!(matches!(
        diagnostics[0].error,
        ProjectReadError::Song(_)
    ));
    assert!(!read_back.project(4).is_populated());
}

#[test]
fn truncated_dumps_still_load_their_header() {
    let mut sav = Sav::new();
    sav.set_active_project(9);
    sav.project_mut(0).set_name(b"TAIL");
    sav.project_mut(0).set_song(Some(incompressible_song()));
    let mut bytes = sav.write_to_memory().unwrap();

    // Chop the dump two blocks into the block area.
    bytes.truncate(0x8200 + 2 * BLOCK_SIZE);

    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert_eq!(read_back.active_project(), 9);
    assert_eq!(read_back.project(0).name_str(), "TAIL");
    // The project itself is gone with the truncated tail.
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].slot, 0);
    assert!(!read_back.project(0).is_populated());
}

#[test]
fn overflowing_saves_are_refused() {
    let mut sav = Sav::new();
    // 65 blocks each; the third project hits the 191-block ceiling.
    for slot in 0..3 {
        sav.project_mut(slot).set_song(Some(incompressible_song()));
    }
    assert_eq!(SONG_BYTE_COUNT.div_ceil(510) * 3, 195);
    match sav.write_to_memory() {
        Err(SavError::Overflow { slot: 2 }) => {}
        other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn barely_fitting_saves_round_trip() {
    let mut sav = Sav::new();
    sav.project_mut(0).set_song(Some(incompressible_song()));
    sav.project_mut(1).set_song(Some(incompressible_song()));
    // 130 of 191 blocks in use.
    let bytes = sav.write_to_memory().unwrap();
    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(read_back, sav);
}

#[test]
fn working_song_is_preserved_verbatim() {
    let mut sav = Sav::new();
    let mut working = SongImage::new();
    working.set_tempo(0xA0);
    working.as_bytes_mut()[0x1030] = 0xBE; // reserved region byte
    sav.set_working_song(working);

    let bytes = sav.write_to_memory().unwrap();
    assert_eq!(bytes[0x3FB4], 0xA0);
    assert_eq!(bytes[0x1030], 0xBE);

    let (read_back, _) = Sav::read_from_memory(&bytes).unwrap();
    assert_eq!(read_back.working_song(), sav.working_song());
}

#[test]
fn mutators_move_the_state_machine_to_dirty() {
    let bytes = Sav::new().write_to_memory().unwrap();
    let (mut sav, _) = Sav::read_from_memory(&bytes).unwrap();
    assert_eq!(sav.state(), SavState::Loaded);
    sav.set_active_project(3);
    assert_eq!(sav.state(), SavState::Dirty);
    // A dirty save can still be written.
    sav.write(&mut Cursor::new(Vec::new())).unwrap();
}

#[test]
fn all_32_slots_are_independent() {
    let mut sav = Sav::new();
    for slot in 0..PROJECT_COUNT {
        let name = [b'A' + (slot % 26) as u8; 4];
        sav.project_mut(slot).set_name(&name);
        sav.project_mut(slot).set_version(slot as u8);
    }
    // Only one actually holds a song.
    sav.project_mut(31).set_song(Some(patterned_song(0x31)));

    let bytes = sav.write_to_memory().unwrap();
    let (read_back, diagnostics) = Sav::read_from_memory(&bytes).unwrap();
    assert!(diagnostics.is_empty());
    for slot in 0..PROJECT_COUNT {
        assert_eq!(read_back.project(slot).version(), slot as u8);
        assert_eq!(
            read_back.project(slot).is_populated(),
            slot == 31,
            "slot {slot}"
        );
    }
}

#[test]
fn exported_projects_survive_a_detour_through_a_sav() {
    let mut sav = Sav::new();
    sav.project_mut(2).set_name(b"ROAM");
    sav.project_mut(2).set_song(Some(patterned_song(0x66)));
    let bytes = sav.write_to_memory().unwrap();
    let (read_back, _) = Sav::read_from_memory(&bytes).unwrap();

    let mut exported = Cursor::new(Vec::new());
    read_back.project(2).write_lsdsng(&mut exported).unwrap();
    let standalone =
        crate::Project::read_lsdsng(&mut Cursor::new(exported.into_inner())).unwrap();
    assert_eq!(standalone.song(), sav.project(2).song());
    assert_eq!(standalone.name_str(), "ROAM");
}

#[test]
fn empty_project_export_error_is_reachable_from_the_sav() {
    let sav = Sav::new();
    let mut sink = Cursor::new(Vec::new());
    assert!(matches!(
        sav.project(0).write_lsdsng(&mut sink),
        Err(ProjectIoError::NoSong)
    ));
}

#[test]
fn compressed_block_area_total_matches_block_count() {
    assert_eq!(SAV_SIZE, SONG_BYTE_COUNT + BLOCK_SIZE + BLOCK_COUNT * BLOCK_SIZE);
}
