//! Entity routes and the back-navigation history the update workflow
//! returns through.

use crate::APPLICATION_NAME;
use std::fmt;

/// Top-level entity sections of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRoute {
    Marca,
    Modelo,
}

impl EntityRoute {
    pub const ALL: [EntityRoute; 2] = [EntityRoute::Marca, EntityRoute::Modelo];

    /// Route path segment; each entity module is mounted under it.
    pub fn path(self) -> &'static str {
        match self {
            Self::Marca => "marca",
            Self::Modelo => "modelo",
        }
    }

    /// i18n key for the section's page title
    pub fn page_title_key(self) -> String {
        format!("{}.{}.home.title", APPLICATION_NAME, self.path())
    }

    /// Resolves a path back to its route; only the first segment matters.
    pub fn from_path(path: &str) -> Option<Self> {
        let first = path.trim_start_matches('/').split('/').next()?;
        Self::ALL.into_iter().find(|route| route.path() == first)
    }
}

impl fmt::Display for EntityRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Navigates back to whatever view preceded the current one.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    fn previous_state(&mut self);
}

/// Back-stack of visited paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: Vec<String>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>) {
        self.entries.push(path.into());
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Navigator for NavigationHistory {
    /// Pops one entry; at the root this is a no-op.
    fn previous_state(&mut self) {
        if self.entries.pop().is_none() {
            tracing::debug!("previous_state called with empty history");
        }
    }
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn previous_state(&mut self) {
        (**self).previous_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_expose_path_and_title_key() {
        assert_eq!(EntityRoute::Marca.path(), "marca");
        assert_eq!(EntityRoute::Modelo.path(), "modelo");
        assert_eq!(
            EntityRoute::Marca.page_title_key(),
            "concesionarioApp.marca.home.title"
        );
        assert_eq!(
            EntityRoute::Modelo.page_title_key(),
            "concesionarioApp.modelo.home.title"
        );
    }

    #[test]
    fn from_path_uses_first_segment() {
        assert_eq!(EntityRoute::from_path("/modelo/3/edit"), Some(EntityRoute::Modelo));
        assert_eq!(EntityRoute::from_path("marca"), Some(EntityRoute::Marca));
        assert_eq!(EntityRoute::from_path("/cliente"), None);
    }

    #[test]
    fn previous_state_pops_one_entry() {
        let mut history = NavigationHistory::new();
        history.push("/modelo");
        history.push("/modelo/new");

        history.previous_state();
        assert_eq!(history.current(), Some("/modelo"));

        history.previous_state();
        history.previous_state();
        assert!(history.is_empty());
    }
}
