//! Platform surface: the collaborators the studio talks to but does not own.
//!
//! The save interaction, toast notifications and temporary download buffers
//! sit behind small traits so the studio can run against real directories
//! and the log, or against in-memory recorders in tests.

pub mod blob;
pub mod download;
pub mod notify;

pub use blob::{BlobHandle, BlobRegistry};
pub use download::{DirectorySink, DownloadRequest, DownloadSink, MemorySink, SavedFile};
pub use notify::{LogNotifier, MemoryNotifier, NoticeLevel, Notifier};
