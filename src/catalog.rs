use serde::{Deserialize, Serialize};
use std::fmt;

/// A blog server, identified by its base URL. Immutable once listed in a
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlogServer(String);

impl BlogServer {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlogServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One server together with the blogs it hosts and the usernames registered
/// on it, both in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub server: BlogServer,
    pub blogs: Vec<String>,
    pub usernames: Vec<String>,
}

/// The catalog of selectable servers. Built once at startup and read-only
/// thereafter; all selection happens by positional index into its lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCatalog {
    entries: Vec<CatalogEntry>,
}

impl ServerCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn servers(&self) -> impl Iterator<Item = &BlogServer> {
        self.entries.iter().map(|entry| &entry.server)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl Default for ServerCatalog {
    /// The built-in server catalog.
    fn default() -> Self {
        Self::new(vec![
            CatalogEntry {
                server: BlogServer::new("http://biolab.isis.rl.ac.uk"),
                blogs: names(&["testing_sandpit", "camerons_labblog", "Lab Materials Login"]),
                usernames: names(&["cameronneylon.net", "cameron.neylon.myopenid.com"]),
            },
            CatalogEntry {
                server: BlogServer::new("http://blogs.chem.soton.ac.uk"),
                blogs: names(&["frey_group", "bio_sandpit"]),
                usernames: names(&["dcn", "ajm3"]),
            },
            CatalogEntry {
                server: BlogServer::new("http://blog_dev.sidious.chem.soton.ac.uk"),
                blogs: names(&["frey_group", "bio_sandpit"]),
                usernames: names(&["dcn", "ajm3"]),
            },
        ])
    }
}
