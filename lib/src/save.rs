//! Saves and loads mementos.

use crate::{error::Error, memento::Memento};
use std::io::{Read, Write};

/// Something that can be written to a byte stream and read back.
///
/// Whatever goes wrong while reading, including a stream in the wrong
/// format, is reported as [`Error::Io`]: callers never learn how the
/// content is encoded.
pub trait Storable {
    /// Replaces the content with what is read from `reader`.
    fn load<R: Read>(&mut self, reader: R) -> Result<(), Error>;

    /// Writes the content to `writer`.
    fn flush<W: Write>(&self, writer: W) -> Result<(), Error>;
}

/// Mementos are stored as JSON.
impl Storable for Memento {
    fn load<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        *self = serde_json::from_reader(reader)?;
        Ok(())
    }

    fn flush<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

impl Memento {
    /// Reads a memento from `reader`.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, Error> {
        let mut memento = Memento::new();
        memento.load(reader)?;
        Ok(memento)
    }
}
