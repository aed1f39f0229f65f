//! Open flags
//!
//! POSIX-style flag words as handed over by WebDAV protocol handlers, and
//! their translation into `std::fs::OpenOptions`.

use std::fs::OpenOptions;

/// How an open request intends to access the file, taken from the low two
/// bits of the flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn reads(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    pub fn writes(self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }
}

/// A POSIX open(2) flag word (Linux bit values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags(u32);

impl OpenFlags {
    pub const RDONLY: u32 = 0o0;
    pub const WRONLY: u32 = 0o1;
    pub const RDWR: u32 = 0o2;
    pub const ACCMODE: u32 = 0o3;
    pub const CREAT: u32 = 0o100;
    pub const EXCL: u32 = 0o200;
    pub const TRUNC: u32 = 0o1000;
    pub const APPEND: u32 = 0o2000;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn read_only() -> Self {
        Self(Self::RDONLY)
    }

    pub const fn write_only() -> Self {
        Self(Self::WRONLY)
    }

    pub const fn read_write() -> Self {
        Self(Self::RDWR)
    }

    /// Returns a copy with `flag` set.
    pub const fn with(self, flag: u32) -> Self {
        Self(self.0 | flag)
    }

    pub const fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// Access intent; both low bits set is treated as read-write.
    pub fn access_mode(self) -> AccessMode {
        match self.0 & Self::ACCMODE {
            Self::RDONLY => AccessMode::ReadOnly,
            Self::WRONLY => AccessMode::WriteOnly,
            _ => AccessMode::ReadWrite,
        }
    }

    /// Builds the `OpenOptions` matching this flag word.
    ///
    /// `mode` sets the permission bits of a newly created file on Unix and is
    /// ignored elsewhere.
    pub fn to_open_options(self, mode: u32) -> OpenOptions {
        let access = self.access_mode();
        let mut options = OpenOptions::new();

        options
            .read(access.reads())
            .write(access.writes())
            .append(self.contains(Self::APPEND))
            .truncate(self.contains(Self::TRUNC));

        if self.contains(Self::CREAT | Self::EXCL) {
            options.create_new(true);
        } else if self.contains(Self::CREAT) {
            options.create(true);
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        options
    }
}

impl From<u32> for OpenFlags {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}
