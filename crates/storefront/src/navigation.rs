//! Navigation sync: address fragment + page title derived from the open product.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use techno_catalog::Product;
use techno_core::ProductId;

/// Marker that prefixes a non-empty fragment.
const FRAGMENT_MARKER: char = '#';

/// The address bar and window title of whatever hosts the view.
pub trait NavigationSurface: Send {
    /// Current fragment, including the leading `#` when non-empty.
    fn fragment(&self) -> String;

    /// Replace the current history entry's fragment. `id` is written without
    /// the marker; an empty `id` clears the fragment.
    fn replace_fragment(&mut self, id: &str);

    fn set_title(&mut self, title: &str);
}

/// Extract the product id from a raw fragment (`"#notebook"` → `notebook`).
///
/// One leading `#` is stripped; empty or blank remainders mean "nothing
/// requested".
pub fn parse_fragment(raw: &str) -> Option<ProductId> {
    let id = raw.strip_prefix(FRAGMENT_MARKER).unwrap_or(raw);
    ProductId::new(id).ok()
}

/// Keeps a [`NavigationSurface`] in step with the open product.
pub struct NavigationSync {
    surface: Box<dyn NavigationSurface>,
    fallback_title: String,
}

impl NavigationSync {
    pub fn new(surface: Box<dyn NavigationSurface>, fallback_title: impl Into<String>) -> Self {
        Self {
            surface,
            fallback_title: fallback_title.into(),
        }
    }

    /// Reflect the open product, or reset to the fallback title and an empty
    /// fragment when nothing is open. Never adds a history entry.
    pub fn sync(&mut self, selected: Option<&Product>) {
        let (title, fragment) = match selected {
            Some(product) if !product.name().is_empty() => (product.name(), product.id_typed().as_str()),
            Some(product) => (self.fallback_title.as_str(), product.id_typed().as_str()),
            None => (self.fallback_title.as_str(), ""),
        };

        self.surface.set_title(title);
        self.surface.replace_fragment(fragment);
        tracing::debug!(title, fragment, "navigation synced");
    }

    /// Show the fallback title without touching the fragment, so an address
    /// that did not resolve stays visible.
    pub fn show_fallback_title(&mut self) {
        self.surface.set_title(&self.fallback_title);
    }

    /// The product the address asks for on startup, if any.
    pub fn requested_product(&self) -> Option<ProductId> {
        parse_fragment(&self.surface.fragment())
    }
}

impl core::fmt::Debug for NavigationSync {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NavigationSync")
            .field("fallback_title", &self.fallback_title)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct MemoryNavigationState {
    /// Fragments of the history entries, oldest first. Never empty.
    history: Vec<String>,
    title: String,
}

/// In-process navigation surface. Clones observe the same address and title.
///
/// Keeps a history stack: [`MemoryNavigation::push_fragment`] adds an entry
/// the way following a link would, while `replace_fragment` rewrites the
/// current one.
#[derive(Debug, Clone)]
pub struct MemoryNavigation {
    state: Arc<Mutex<MemoryNavigationState>>,
}

impl MemoryNavigation {
    pub fn new() -> Self {
        Self::with_fragment("")
    }

    /// Start as if the address had been opened with this fragment.
    pub fn with_fragment(fragment: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryNavigationState {
                history: vec![fragment.into()],
                title: String::new(),
            })),
        }
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    /// History entries the user could navigate back through.
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// Navigate to a new address, adding a history entry.
    pub fn push_fragment(&self, fragment: impl Into<String>) {
        self.lock().history.push(fragment.into());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryNavigationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigation {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationSurface for MemoryNavigation {
    fn fragment(&self) -> String {
        self.lock().history.last().cloned().unwrap_or_default()
    }

    fn replace_fragment(&mut self, id: &str) {
        let fragment = if id.is_empty() {
            String::new()
        } else {
            format!("{FRAGMENT_MARKER}{id}")
        };
        let mut state = self.lock();
        match state.history.last_mut() {
            Some(current) => *current = fragment,
            None => state.history.push(fragment),
        }
    }

    fn set_title(&mut self, title: &str) {
        self.lock().title = title.to_string();
    }
}
