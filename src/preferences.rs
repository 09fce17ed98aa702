//! Session preferences: which server, blog and username posts go to.
//!
//! A [`PreferencesStore`] is created once per session and outlives the
//! documents that consult it. Selection is positional: the caller passes an
//! index into the catalog's ordered lists, the store validates it, mutates,
//! appends a status line and publishes the matching notification. A rejected
//! index leaves the whole selection untouched and publishes `DocumentError`.

use thiserror::Error;
use tracing::{error, info};

use crate::catalog::{BlogServer, CatalogEntry, ServerCatalog};
use crate::notify::{EventKind, Notification, NotificationBus, SubscriptionId};
use crate::status::StatusLog;

/// A catalog unusable for selection. Raised only at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must list at least one blog server")]
    NoServers,
    #[error("server {server} lists no blogs")]
    NoBlogs { server: String },
    #[error("server {server} lists no usernames")]
    NoUsernames { server: String },
}

/// An out-of-range selection index. State is untouched when one of these is
/// returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("server index {index} is out of range ({len} servers listed)")]
    ServerIndex { index: usize, len: usize },
    #[error("blog index {index} is out of range ({len} blogs on {server})")]
    BlogIndex {
        index: usize,
        len: usize,
        server: String,
    },
    #[error("username index {index} is out of range ({len} usernames on {server})")]
    UsernameIndex {
        index: usize,
        len: usize,
        server: String,
    },
}

/// Catalog of selectable servers plus the current
/// server/blog/username triple.
#[derive(Debug)]
pub struct PreferencesStore {
    catalog: ServerCatalog,
    server_index: usize,
    current_blog: String,
    current_username: String,
    status: StatusLog,
    bus: NotificationBus,
}

impl PreferencesStore {
    /// A store over the built-in catalog, selecting the first server and its
    /// first blog and username.
    pub fn new() -> Self {
        let catalog = ServerCatalog::default();
        let first = &catalog.entries()[0];
        let current_blog = first.blogs[0].clone();
        let current_username = first.usernames[0].clone();
        Self {
            catalog,
            server_index: 0,
            current_blog,
            current_username,
            status: StatusLog::new(),
            bus: NotificationBus::new(),
        }
    }

    /// A store over a caller-supplied catalog. Every server must list at
    /// least one blog and one username, since construction (and the cascade
    /// on server change) selects first entries.
    pub fn with_catalog(catalog: ServerCatalog) -> Result<Self, CatalogError> {
        if catalog.is_empty() {
            return Err(CatalogError::NoServers);
        }
        for entry in catalog.entries() {
            if entry.blogs.is_empty() {
                return Err(CatalogError::NoBlogs {
                    server: entry.server.url().to_string(),
                });
            }
            if entry.usernames.is_empty() {
                return Err(CatalogError::NoUsernames {
                    server: entry.server.url().to_string(),
                });
            }
        }
        let first = &catalog.entries()[0];
        let current_blog = first.blogs[0].clone();
        let current_username = first.usernames[0].clone();
        Ok(Self {
            catalog,
            server_index: 0,
            current_blog,
            current_username,
            status: StatusLog::new(),
            bus: NotificationBus::new(),
        })
    }

    fn current_entry(&self) -> &CatalogEntry {
        // server_index is validated on every assignment and the catalog is
        // immutable, so this cannot go out of bounds.
        &self.catalog.entries()[self.server_index]
    }

    pub fn catalog(&self) -> &ServerCatalog {
        &self.catalog
    }

    pub fn current_server(&self) -> &BlogServer {
        &self.current_entry().server
    }

    pub fn current_blog(&self) -> &str {
        &self.current_blog
    }

    pub fn current_username(&self) -> &str {
        &self.current_username
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn last_status(&self) -> Option<&str> {
        self.status.last()
    }

    /// Select a server by its position in the catalog. On success the blog
    /// and username cascade to the new server's first entries, so the
    /// selection triple is always internally consistent; `ServerSelected`,
    /// `BlogSelected` and `UsernameSelected` are published in that order.
    pub fn select_server(&mut self, index: usize) -> Result<(), SelectionError> {
        let len = self.catalog.len();
        if index >= len {
            let err = SelectionError::ServerIndex { index, len };
            return Err(self.reject(err));
        }
        self.server_index = index;
        let server = self.current_entry().server.clone();
        self.status.push(format!("Blog server set to: {server}"));
        info!(server = %server, "blog server selected");
        self.bus.publish(&Notification::ServerSelected(server));

        self.apply_blog(0);
        self.apply_username(0);
        Ok(())
    }

    /// Select a blog on the current server by position.
    pub fn select_blog(&mut self, index: usize) -> Result<(), SelectionError> {
        let entry = self.current_entry();
        if index >= entry.blogs.len() {
            let err = SelectionError::BlogIndex {
                index,
                len: entry.blogs.len(),
                server: entry.server.url().to_string(),
            };
            return Err(self.reject(err));
        }
        self.apply_blog(index);
        Ok(())
    }

    /// Select a username on the current server by position.
    pub fn select_username(&mut self, index: usize) -> Result<(), SelectionError> {
        let entry = self.current_entry();
        if index >= entry.usernames.len() {
            let err = SelectionError::UsernameIndex {
                index,
                len: entry.usernames.len(),
                server: entry.server.url().to_string(),
            };
            return Err(self.reject(err));
        }
        self.apply_username(index);
        Ok(())
    }

    fn apply_blog(&mut self, index: usize) {
        let blog = self.current_entry().blogs[index].clone();
        self.current_blog = blog;
        self.status.push(format!("Blog set to: {}", self.current_blog));
        info!(blog = %self.current_blog, "blog selected");
        self.bus
            .publish(&Notification::BlogSelected(self.current_blog.clone()));
    }

    fn apply_username(&mut self, index: usize) {
        let username = self.current_entry().usernames[index].clone();
        self.current_username = username;
        self.status
            .push(format!("Username set to: {}", self.current_username));
        info!(username = %self.current_username, "username selected");
        self.bus
            .publish(&Notification::UsernameSelected(self.current_username.clone()));
    }

    fn reject(&self, err: SelectionError) -> SelectionError {
        error!(error = %err, "selection rejected");
        self.bus
            .publish(&Notification::DocumentError(err.to_string()));
        err
    }

    /// Restore the fresh-construction selection and clear the status log.
    /// Subscriptions survive; nothing is published.
    pub fn reset(&mut self) {
        self.server_index = 0;
        let (blog, username) = {
            let first = &self.catalog.entries()[0];
            (first.blogs[0].clone(), first.usernames[0].clone())
        };
        self.current_blog = blog;
        self.current_username = username;
        self.status.clear();
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.bus.subscribe(kind, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}

impl Default for PreferencesStore {
    fn default() -> Self {
        Self::new()
    }
}
