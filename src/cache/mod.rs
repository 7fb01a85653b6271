//! SQLite-based result cache.
//!
//! Persistent caching of table profiles and resolved relationship graphs,
//! keyed by content fingerprints. The cache is stored in
//! `~/.relmine/cache.db` by default.
//!
//! # Design
//!
//! - Simple key-value store with JSON values
//! - No TTL - entries stay valid until their fingerprint stops matching
//! - Versioned - auto-clears on version mismatch
//!
//! # Key Format
//!
//! ```text
//! profile:{table_fingerprint}  -> TableProfile
//! graph:{corpus_fingerprint}   -> RelationshipGraph
//! ```
//!
//! Fingerprints already encode the source data and the analysis-relevant
//! configuration, so lookups are pure key matches with no freshness logic.

mod fingerprint;
pub use fingerprint::{compute_hash, graph_fingerprint, table_fingerprint};

use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::mine::RelationshipGraph;
use crate::profile::TableProfile;

/// Current cache schema version. Bump this when the cache format changes.
const CACHE_VERSION: i32 = 1;

/// SQLite-based profile and graph cache.
pub struct ProfileCache {
    conn: Connection,
}

impl ProfileCache {
    /// Open or create the cache database.
    ///
    /// With no explicit path the cache lives at `~/.relmine/cache.db`.
    /// If the stored cache version doesn't match, it's automatically cleared.
    pub fn open(path: Option<PathBuf>) -> AnalysisResult<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let cache = Self { conn };
        cache.init()?;

        Ok(cache)
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> AnalysisResult<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init()?;
        Ok(cache)
    }

    /// Default on-disk location of the cache database.
    pub fn default_path() -> AnalysisResult<PathBuf> {
        let base = dirs::home_dir().ok_or(AnalysisError::NoCacheDir)?;
        Ok(base.join(".relmine").join("cache.db"))
    }

    fn init(&self) -> AnalysisResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == CACHE_VERSION => {}
            Some(_) => {
                self.clear_all()?;
                self.set_version()?;
            }
            None => {
                self.set_version()?;
            }
        }

        Ok(())
    }

    fn set_version(&self) -> AnalysisResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![CACHE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Look up a cached table profile by fingerprint.
    ///
    /// Unreadable or corrupt entries count as a miss; the profile is simply
    /// recomputed and the entry overwritten.
    pub fn get_profile(&self, fingerprint: &str) -> Option<TableProfile> {
        self.get(&profile_key(fingerprint)).unwrap_or(None)
    }

    /// Store a table profile under its fingerprint.
    pub fn put_profile(&self, fingerprint: &str, profile: &TableProfile) -> AnalysisResult<()> {
        self.set(&profile_key(fingerprint), profile)
    }

    /// Look up a cached relationship graph by corpus fingerprint.
    pub fn get_graph(&self, fingerprint: &str) -> Option<RelationshipGraph> {
        self.get(&graph_key(fingerprint)).unwrap_or(None)
    }

    /// Store a resolved relationship graph under its corpus fingerprint.
    pub fn put_graph(&self, fingerprint: &str, graph: &RelationshipGraph) -> AnalysisResult<()> {
        self.set(&graph_key(fingerprint), graph)
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> AnalysisResult<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> AnalysisResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Clear all cache entries (but keep metadata).
    pub fn clear_all(&self) -> AnalysisResult<()> {
        self.conn.execute("DELETE FROM cache", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> AnalysisResult<CacheStats> {
        let entry_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;

        let total_size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(value)), 0) FROM cache",
            [],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            entry_count: entry_count as usize,
            total_size_bytes: total_size as usize,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of entries in the cache.
    pub entry_count: usize,
    /// Total size of all values in bytes.
    pub total_size_bytes: usize,
}

fn profile_key(fingerprint: &str) -> String {
    format!("profile:{fingerprint}")
}

fn graph_key(fingerprint: &str) -> String {
    format!("graph:{fingerprint}")
}
