use tessel_primitives::Buf32;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store name '{0}'")]
    InvalidName(String),

    #[error("store '{0}' is already mounted")]
    DuplicateMount(String),

    #[error("store '{0}' is not mounted")]
    NotMounted(String),

    #[error("cannot mount store '{0}' after load")]
    MountAfterLoad(String),

    #[error("registry already loaded")]
    AlreadyLoaded,

    #[error("registry not loaded")]
    NotLoaded,

    #[error("store '{store}' root mismatch at version {version} (recorded {recorded}, computed {computed})")]
    RootMismatch {
        store: String,
        version: u64,
        recorded: Buf32,
        computed: Buf32,
    },

    #[error("store '{0}' holds data but no commit was recorded for it")]
    MissingMetadata(String),

    #[error("no commit record for version {0}")]
    MissingCommit(u64),

    #[error("corrupt commit metadata: {0}")]
    CorruptMetadata(String),

    #[error("db: {0}")]
    Sled(#[from] sled::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
