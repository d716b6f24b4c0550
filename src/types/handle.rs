//! Handle type for DWG records
//!
//! Every record in a DWG file is identified by an unsigned handle. Records
//! never point at each other directly; they store handles that are
//! resolved through the object map or a caller-side lookup.

use std::fmt;

/// An opaque record identifier.
///
/// Handle 0 is the null handle. Uniqueness is a property of the file, not
/// something the decoder can rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The null/invalid handle (0)
    pub const NULL: Handle = Handle(0);

    /// Create a new handle from a u64 value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if this is a null/invalid handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Check if this is a valid handle
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Reference code stored in the high nibble of an encoded handle.
///
/// Codes 2..=5 carry an absolute value and describe the ownership kind.
/// Codes 6, 8, 0xA and 0xC are relative to the handle of the record being
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReferenceType {
    /// Code 0 (also 1): plain absolute handle
    Undefined = 0,
    /// Code 2
    SoftOwnership = 2,
    /// Code 3
    HardOwnership = 3,
    /// Code 4
    SoftPointer = 4,
    /// Code 5
    HardPointer = 5,
    /// Code 6: reference + 1
    PlusOne = 6,
    /// Code 8: reference - 1
    MinusOne = 8,
    /// Code 0xA: reference + value
    PlusOffset = 0xA,
    /// Code 0xC: reference - value
    MinusOffset = 0xC,
}

impl ReferenceType {
    /// Map a raw code nibble. Codes outside the table are malformed.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 | 1 => Some(ReferenceType::Undefined),
            2 => Some(ReferenceType::SoftOwnership),
            3 => Some(ReferenceType::HardOwnership),
            4 => Some(ReferenceType::SoftPointer),
            5 => Some(ReferenceType::HardPointer),
            6 => Some(ReferenceType::PlusOne),
            8 => Some(ReferenceType::MinusOne),
            0xA => Some(ReferenceType::PlusOffset),
            0xC => Some(ReferenceType::MinusOffset),
            _ => None,
        }
    }

    /// Whether the stored value is the handle itself.
    pub fn is_absolute(&self) -> bool {
        (*self as u8) <= 5
    }
}

/// A decoded handle reference: the raw code plus the resolved handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleRef {
    /// Raw code nibble.
    pub code: u8,
    /// Absolute handle after applying the code.
    pub handle: Handle,
}

impl HandleRef {
    pub fn new(code: u8, handle: u64) -> Self {
        Self {
            code,
            handle: Handle::new(handle),
        }
    }

    /// Resolve an encoded `(code, value)` pair against the handle of the
    /// record that contains it. Returns `None` for malformed codes.
    pub fn resolve(code: u8, value: u64, reference: u64) -> Option<Self> {
        let handle = match ReferenceType::from_code(code)? {
            ReferenceType::PlusOne => reference.wrapping_add(1),
            ReferenceType::MinusOne => reference.wrapping_sub(1),
            ReferenceType::PlusOffset => reference.wrapping_add(value),
            ReferenceType::MinusOffset => reference.wrapping_sub(value),
            _ => value,
        };
        Some(Self::new(code, handle))
    }
}
