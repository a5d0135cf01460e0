//! Backup export: pastes packed into a gzipped tar.
//!
//! One regular-file entry per paste, named by its public id, holding the raw
//! value, with the creation time as the entry's mtime.

use crate::models::paste::Paste;
use flate2::{Compression, write::GzEncoder};
use std::io::{self, Write};
use tar::{Builder, EntryType, Header};

/// Write `pastes` as a `.tar.gz` stream into `writer` and hand it back.
pub fn write_archive<W: Write>(pastes: &[Paste], writer: W) -> io::Result<W> {
    let mut tar = Builder::new(GzEncoder::new(writer, Compression::default()));

    for paste in pastes {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(paste.value.len() as u64);
        header.set_mode(0o644);
        // pre-epoch timestamps cannot be represented
        header.set_mtime(u64::try_from(paste.created_at.timestamp()).unwrap_or(0));
        tar.append_data(&mut header, paste.id.to_string(), paste.value.as_bytes())?;
    }

    tar.into_inner()?.finish()
}
