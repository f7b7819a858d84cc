//! Small library to inspect [MaxMind DB](https://maxmind.github.io/MaxMind-DB/)
//! (`.mmdb`) geolocation/ASN database files.
//!
//! An inspection opens a database, snapshots its embedded metadata (type, IP
//! version, node count, record size, build timestamp, description) and resolves
//! one sample IP lookup. Parsing of the binary format itself is delegated to
//! the [`maxminddb`] crate; nothing here touches the on-disk layout.
//!
//! For a single file, see [`inspect`]. To walk every database in a directory,
//! see [`discover_databases`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::net::{AddrParseError, IpAddr};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use maxminddb::Reader;
use serde_json::Value;
use thiserror::Error;

/// File extension of MaxMind DB databases, without the leading dot
pub const DB_EXTENSION: &str = "mmdb";

/// Error type for inspection and discovery operations
///
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The file or directory is missing, unreadable, or not a well-formed
    /// database. `reason` is the underlying diagnostic as a single message;
    /// no attempt is made to classify the malformation further.
    #[error("cannot open {}: {reason}", path.display())]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Diagnostic from the filesystem or the format library
        reason: String,
    },

    /// The probe address is not a syntactically valid IPv4 or IPv6 address
    #[error("invalid IP address {address:?}: {source}")]
    InvalidAddress {
        /// The rejected input string
        address: String,
        /// Parse error from the standard library
        source: AddrParseError,
    },
}

impl ProbeError {
    fn open(path: &Path, reason: impl Into<String>) -> Self {
        ProbeError::Open {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Metadata embedded in a database file
///
/// A read-only snapshot taken once when the database is opened. Fields mirror
/// the metadata section of the MaxMind DB format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseMetadata {
    /// Database type, e.g. `"GeoLite2-ASN"` or `"DBIP-ASN-Lite"`
    pub database_type: String,
    /// IP version the search tree covers: 4 or 6
    pub ip_version: u16,
    /// Number of nodes in the search tree
    pub node_count: u32,
    /// Size of one search tree record in bits
    pub record_size: u16,
    /// Build timestamp as Unix seconds
    pub build_epoch: u64,
    /// Human-readable description per language code
    pub description: BTreeMap<String, String>,
}

impl DatabaseMetadata {
    /// Build timestamp as a UTC datetime
    ///
    /// Returns `None` for an epoch outside the representable range.
    pub fn build_time(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.build_epoch).ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

impl From<&maxminddb::Metadata> for DatabaseMetadata {
    fn from(metadata: &maxminddb::Metadata) -> Self {
        DatabaseMetadata {
            database_type: metadata.database_type.clone(),
            ip_version: metadata.ip_version,
            node_count: metadata.node_count,
            record_size: metadata.record_size,
            build_epoch: metadata.build_epoch,
            description: metadata.description.clone(),
        }
    }
}

impl fmt::Display for DatabaseMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "database type: {}", self.database_type)?;
        writeln!(f, "ip version:    {}", self.ip_version)?;
        writeln!(f, "node count:    {}", self.node_count)?;
        writeln!(f, "record size:   {}", self.record_size)?;
        match self.build_time() {
            Some(time) => writeln!(f, "built:         {} ({})", time, self.build_epoch)?,
            None => writeln!(f, "built:         {}", self.build_epoch)?,
        }
        write!(f, "description:  ")?;
        for (language, text) in &self.description {
            write!(f, " {}: {}", language, text)?;
        }
        Ok(())
    }
}

/// Result of inspecting one database file
///
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    /// Metadata snapshot taken at open time
    pub metadata: DatabaseMetadata,
    /// Record stored for the probed address, forwarded unchanged as a
    /// JSON-like value. `None` means the address is not covered by any
    /// entry, which is a normal outcome rather than an error.
    pub lookup: Option<Value>,
}

/// Inspect a database file against a probe address given as a string
///
/// The address is parsed before anything is opened, so a malformed probe
/// never performs a partial lookup. See [`inspect_addr`] for the rest of the
/// behavior.
///
/// # Errors
///
/// [`ProbeError::InvalidAddress`] if `probe` is not an IP address, otherwise
/// whatever [`inspect_addr`] returns.
///
pub fn inspect<P: AsRef<Path>>(path: P, probe: &str) -> Result<Inspection, ProbeError> {
    let address: IpAddr = probe.parse().map_err(|source| ProbeError::InvalidAddress {
        address: probe.to_string(),
        source,
    })?;
    inspect_addr(path, address)
}

/// Inspect a database file against an already-parsed probe address
///
/// Opens the file, snapshots the six metadata fields once, performs exactly
/// one lookup and drops the handle before returning, on error paths included.
/// The call owns its handle exclusively; concurrent inspections each open
/// their own. Purely read-only, so repeated calls with the same inputs return
/// equal results.
///
/// # Errors
///
/// [`ProbeError::Open`] if the file is missing, unreadable, or rejected by
/// the format library, with the library's diagnostic as the message.
///
pub fn inspect_addr<P: AsRef<Path>>(path: P, address: IpAddr) -> Result<Inspection, ProbeError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| ProbeError::open(path, err.to_string()))?;
    let reader =
        Reader::from_source(bytes).map_err(|err| ProbeError::open(path, err.to_string()))?;

    let metadata = DatabaseMetadata::from(&reader.metadata);
    debug!(
        "opened {}: {}, {} nodes",
        path.display(),
        metadata.database_type,
        metadata.node_count
    );

    let result = reader
        .lookup(address)
        .map_err(|err| ProbeError::open(path, format!("lookup for {} failed: {}", address, err)))?;
    let lookup = if result.has_data() {
        result.decode::<Value>().map_err(|err| {
            ProbeError::open(path, format!("cannot decode record for {}: {}", address, err))
        })?
    } else {
        None
    };

    Ok(Inspection { metadata, lookup })
}

/// Discover database files in a directory
///
/// Returns a lazy iterator over the directory's immediate entries (no
/// recursion) that are regular files with the [`DB_EXTENSION`] extension, in
/// directory-listing order. Entries that cannot be read are logged and
/// skipped. Call again to restart the listing.
///
/// # Errors
///
/// [`ProbeError::Open`] if `directory` does not exist or is not a directory.
///
pub fn discover_databases<P: AsRef<Path>>(
    directory: P,
) -> Result<impl Iterator<Item = PathBuf>, ProbeError> {
    let directory = directory.as_ref();
    let entries =
        fs::read_dir(directory).map_err(|err| ProbeError::open(directory, err.to_string()))?;

    let listed = directory.to_path_buf();
    Ok(entries.filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in {}: {}", listed.display(), err);
                return None;
            }
        };
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|extension| extension == DB_EXTENSION);
        (matches && path.is_file()).then_some(path)
    }))
}
