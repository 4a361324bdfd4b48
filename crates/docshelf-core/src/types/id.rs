//! Newtype wrappers around [`uuid::Uuid`] for all domain entity identifiers,
//! plus the identifier generator that mints them.
//!
//! Using distinct types prevents accidentally passing a `FileId` where a
//! `FolderId` is expected. Identifiers display and parse as their canonical
//! hyphenated string form, which is also their serialized representation.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a folder.
    FolderId
);

define_id!(
    /// Unique identifier for a file.
    FileId
);

impl FolderId {
    /// The fixed identifier of the root folder.
    pub const ROOT: FolderId = FolderId(Uuid::nil());

    /// Returns `true` for the root folder's identifier.
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

/// Source of fresh, process-unique entity identifiers.
pub trait IdGenerator: Send + Sync + fmt::Debug + 'static {
    /// Produce an identifier never returned before by this generator.
    fn next_id(&self) -> Uuid;

    /// Produce a fresh folder identifier.
    fn folder_id(&self) -> FolderId {
        FolderId(self.next_id())
    }

    /// Produce a fresh file identifier.
    fn file_id(&self) -> FileId {
        FileId(self.next_id())
    }
}

/// Time-ordered UUIDv7 generator used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Deterministic generator yielding `1, 2, 3, ...` encoded as UUIDs.
///
/// Starts at 1 so it never collides with [`FolderId::ROOT`].
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first identifier is `1`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(u128::from(n))
    }
}
