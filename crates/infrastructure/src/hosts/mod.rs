pub mod dns_flush;
pub mod fallback_writer;
pub mod file_store;
pub mod resolution_probe;
pub mod strategies;

pub use dns_flush::SystemDnsFlusher;
pub use fallback_writer::FallbackHostsWriter;
pub use file_store::SystemHostsFile;
pub use resolution_probe::SystemResolutionProbe;
pub use strategies::{
    default_strategies, AtomicRename, DirectWrite, ElevatedShell, PermissionReset, PrivilegedCopy,
};
