//! Dimension style table entry
//!
//! A dimstyle is a named set of `DIM*` variables. They are stored in a
//! fixed per-version order, like the drawing header, and are kept here in
//! the same [`HeaderVariables`] container.

use crate::header::HeaderVariables;
use crate::types::Handle;

use super::TableEntryCommon;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimStyle {
    pub entry: TableEntryCommon,
    pub variables: HeaderVariables,
    pub text_style: Handle,
    /// R2000+ arrow blocks
    pub leader_arrow: Handle,
    pub arrow: Handle,
    pub arrow1: Handle,
    pub arrow2: Handle,
    /// R2007+ linetypes
    pub dimension_linetype: Handle,
    pub extension1_linetype: Handle,
    pub extension2_linetype: Handle,
}

impl DimStyle {
    /// Overall scale (`DIMSCALE`), 1.0 when absent.
    pub fn scale(&self) -> f64 {
        self.variables.double("DIMSCALE").unwrap_or(1.0)
    }

    /// Arrow size (`DIMASZ`).
    pub fn arrow_size(&self) -> f64 {
        self.variables.double("DIMASZ").unwrap_or(0.18)
    }

    /// Text height (`DIMTXT`).
    pub fn text_height(&self) -> f64 {
        self.variables.double("DIMTXT").unwrap_or(0.18)
    }
}

impl_table_entry!(DimStyle, "DIMSTYLE");
