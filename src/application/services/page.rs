//! Page service
//!
//! Loads page descriptions into a component arena and answers the queries
//! the editing UI and the renderer ask about single components.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    AttrValue, AttributeFieldset, FieldKind, NodeId, Page, PageBuilder, RenderProps,
};
use crate::infrastructure::traits::FileSystem;

/// One resolved attribute of a component, with where it comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute {
    pub key: String,
    pub value: AttrValue,
    /// Node in the master chain holding the winning value
    pub origin: NodeId,
    pub origin_label: String,
    /// True unless the value is a local override of the queried node
    pub inherited: bool,
    /// How the editing UI should edit this key
    pub field: FieldKind,
}

/// Counts reported after a structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    /// All nodes including root masters and mirrored variants
    pub nodes: usize,
    /// Named components from the page description
    pub components: usize,
    pub roots: usize,
    pub max_depth: usize,
}

/// Service for loading and querying pages.
pub struct PageService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl PageService {
    /// Create a new page service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Pick the page file: the explicit one, else `default_page` from settings.
    pub fn page_path(&self, page: Option<&Path>) -> ApplicationResult<PathBuf> {
        page.map(Path::to_path_buf)
            .or_else(|| self.settings.default_page.clone())
            .ok_or(ApplicationError::NoPage)
    }

    /// Read, parse and build a page file, then verify its structure.
    pub fn load(&self, path: &Path) -> ApplicationResult<Page> {
        debug!("load: page={}", path.display());
        if !self.fs.exists(path) {
            return Err(ApplicationError::PageNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("read page: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a file",
                )),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read page", path)?;

        let page = PageBuilder::new().build_from_str(&content)?;
        page.arena.check_invariants()?;
        debug!("load: built {} nodes", page.arena.len());
        Ok(page)
    }

    /// Built-in attribute fields with the configured overrides applied.
    pub fn fieldset(&self) -> AttributeFieldset {
        let mut fieldset = AttributeFieldset::builtin();
        fieldset.extend(&self.settings.fields);
        fieldset
    }

    /// Resolved attributes of component `name`, sorted by key.
    ///
    /// With `local_only` the master chain is ignored and only the
    /// component's own overrides are returned.
    pub fn resolved_attributes(
        &self,
        page: &Page,
        name: &str,
        local_only: bool,
    ) -> ApplicationResult<Vec<ResolvedAttribute>> {
        let id = page.resolve(name)?;
        let fieldset = self.fieldset();

        let resolved = page
            .arena
            .get_all_attrs_with_origin(id)?
            .into_iter()
            .filter(|(_, _, origin)| !local_only || *origin == id)
            .map(|(key, value, origin)| {
                let origin_label = page
                    .arena
                    .get_node(origin)
                    .map(|n| n.label())
                    .unwrap_or_default();
                let field = fieldset.field_for(&key).clone();
                ResolvedAttribute {
                    key,
                    value,
                    origin,
                    origin_label,
                    inherited: origin != id,
                    field,
                }
            })
            .collect();
        Ok(resolved)
    }

    /// Resolved attributes of `name` split for the renderer.
    pub fn render_props(&self, page: &Page, name: &str) -> ApplicationResult<RenderProps> {
        let id = page.resolve(name)?;
        Ok(page.arena.render_props(id, &self.settings.html_keys)?)
    }

    /// Check both trees and count what the page holds.
    pub fn summarize(&self, page: &Page) -> ApplicationResult<PageSummary> {
        page.arena.check_invariants()?;
        Ok(PageSummary {
            nodes: page.arena.len(),
            components: page.names().count(),
            roots: page.roots().len(),
            max_depth: page
                .roots()
                .iter()
                .map(|&root| page.arena.depth(root))
                .max()
                .unwrap_or(0),
        })
    }
}
