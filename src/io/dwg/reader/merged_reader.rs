//! Merged reader over the data, string and handle streams of a record.
//!
//! From R2000 on, the handle references of a record follow its data bits;
//! from R2007 on, its strings live in a third stream located from the end
//! of the data. [`DwgMergedReader`] keeps one cursor per stream and routes
//! text and handle reads to the right one. Everything else goes to the
//! main cursor through `Deref`.

use std::ops::{Deref, DerefMut};

use crate::error::{DwgError, Result};
use crate::types::{Color, DwgVersion, HandleRef};

use super::bit_reader::DwgBitReader;

/// Reader that multiplexes the data, string and handle streams.
#[derive(Debug, Clone)]
pub struct DwgMergedReader<'a> {
    main: DwgBitReader<'a>,
    text: Option<DwgBitReader<'a>>,
    handles: Option<DwgBitReader<'a>>,
    /// Handle of the record being read; relative handle codes resolve
    /// against it.
    current_handle: u64,
}

impl<'a> DwgMergedReader<'a> {
    /// A reader with every stream inline in `main`.
    pub fn new(main: DwgBitReader<'a>) -> Self {
        Self {
            main,
            text: None,
            handles: None,
            current_handle: 0,
        }
    }

    pub fn with_text(mut self, text: DwgBitReader<'a>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_handles(mut self, handles: DwgBitReader<'a>) -> Self {
        self.handles = Some(handles);
        self
    }

    pub fn set_text(&mut self, text: Option<DwgBitReader<'a>>) {
        self.text = text;
    }

    pub fn set_handles(&mut self, handles: Option<DwgBitReader<'a>>) {
        self.handles = handles;
    }

    pub fn main(&self) -> &DwgBitReader<'a> {
        &self.main
    }

    pub fn main_mut(&mut self) -> &mut DwgBitReader<'a> {
        &mut self.main
    }

    /// The handle cursor, or the main one when handles are inline.
    pub fn handles_mut(&mut self) -> &mut DwgBitReader<'a> {
        self.handles.as_mut().unwrap_or(&mut self.main)
    }

    fn text_mut(&mut self) -> &mut DwgBitReader<'a> {
        self.text.as_mut().unwrap_or(&mut self.main)
    }

    pub fn has_text_stream(&self) -> bool {
        self.text.is_some()
    }

    pub fn current_handle(&self) -> u64 {
        self.current_handle
    }

    pub fn set_current_handle(&mut self, handle: u64) {
        self.current_handle = handle;
    }

    pub fn version(&self) -> DwgVersion {
        self.main.version()
    }

    /// Whether every stream stayed inside its buffer.
    pub fn is_good(&self) -> bool {
        self.main.is_good()
            && self.text.as_ref().map_or(true, |t| t.is_good())
            && self.handles.as_ref().map_or(true, |h| h.is_good())
    }

    pub fn ensure_good(&self, context: &str) -> Result<()> {
        self.main.ensure_good(context)?;
        if let Some(t) = &self.text {
            t.ensure_good(&format!("{} (strings)", context))?;
        }
        if let Some(h) = &self.handles {
            if !h.is_good() {
                return Err(DwgError::StreamOverrun {
                    context: format!("{} (handles)", context),
                    bit_position: h.position_in_bits(),
                });
            }
        }
        Ok(())
    }

    /// TV from the string stream.
    pub fn read_variable_text(&mut self) -> String {
        self.text_mut().read_variable_text()
    }

    /// TU from the string stream.
    pub fn read_text_unicode(&mut self) -> String {
        self.text_mut().read_text_unicode()
    }

    /// H from the handle stream, relative codes resolved against the
    /// current record handle.
    pub fn read_handle(&mut self) -> HandleRef {
        let reference = self.current_handle;
        self.handles_mut().read_handle_from(reference)
    }

    /// Absolute handle value from the handle stream.
    pub fn handle_reference(&mut self) -> u64 {
        self.read_handle().handle.value()
    }

    /// CMC with any color/book names taken from the string stream.
    pub fn read_cm_color(&mut self) -> Color {
        if self.text.is_none() {
            return self.main.read_cm_color();
        }
        let index = self.main.read_bit_short();
        let rgb = self.main.read_bit_long() as u32;
        let name_flags = self.main.read_byte();
        if name_flags & 1 != 0 {
            self.read_variable_text();
        }
        if name_flags & 2 != 0 {
            self.read_variable_text();
        }
        Color::from_true_color(rgb, index)
    }
}

impl<'a> Deref for DwgMergedReader<'a> {
    type Target = DwgBitReader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.main
    }
}

impl<'a> DerefMut for DwgMergedReader<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.main
    }
}
