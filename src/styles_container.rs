//! Style registry: deduplication, placement and freezing of styles
//!
//! Every style is stored once, under its [`StyleKey`], in one of three
//! destinations. Iteration order within a destination is insertion order so the
//! generated XML is deterministic.
//!
//! Once [`StylesContainer::freeze`] has been called, the registry no longer accepts
//! new keys: the styles have been (or are being) written by the flush thread and
//! any style created later could not be declared before its first use.

use crate::error::{OdsError, Result};
use crate::style::{
    validate_style_name, DataStyle, MasterPageStyle, ObjectStyle, PageLayoutStyle, PageStyle,
    StyleKey, TableCellStyle,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Registration semantics for an already known key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Insert if absent, no-op otherwise
    Create,
    /// Replace an existing entry; the key must exist
    Update,
    /// Insert or replace
    CreateOrUpdate,
}

/// Output location of a style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dest {
    /// `office:automatic-styles` of content.xml
    ContentAutomaticStyles,
    /// `office:automatic-styles` of styles.xml
    StylesAutomaticStyles,
    /// `office:styles` of styles.xml
    StylesCommonStyles,
}

impl Dest {
    fn index(self) -> usize {
        match self {
            Dest::ContentAutomaticStyles => 0,
            Dest::StylesAutomaticStyles => 1,
            Dest::StylesCommonStyles => 2,
        }
    }
}

/// Keyed values split across the three destinations
#[derive(Debug, Clone)]
pub struct MultiContainer<K, V> {
    buckets: [IndexMap<K, V>; 3],
    dest_by_key: HashMap<K, Dest>,
    frozen: bool,
}

impl<K, V> Default for MultiContainer<K, V> {
    fn default() -> Self {
        MultiContainer {
            buckets: [IndexMap::new(), IndexMap::new(), IndexMap::new()],
            dest_by_key: HashMap::new(),
            frozen: false,
        }
    }
}

impl<K: Hash + Eq + Clone + ToString, V> MultiContainer<K, V> {
    /// Returns `Ok(true)` when the value was stored
    pub fn add(&mut self, key: K, dest: Dest, value: V, mode: Mode) -> Result<bool> {
        match self.dest_by_key.get(&key).copied() {
            None => {
                if mode == Mode::Update {
                    return Err(OdsError::StyleNotFound(key.to_string()));
                }
                if self.frozen {
                    return Err(OdsError::StylesFrozen(key.to_string()));
                }
                self.dest_by_key.insert(key.clone(), dest);
                self.buckets[dest.index()].insert(key, value);
                Ok(true)
            }
            Some(_) if self.frozen || mode == Mode::Create => Ok(false),
            Some(old_dest) => {
                if old_dest != dest {
                    self.buckets[old_dest.index()].shift_remove(&key);
                    self.dest_by_key.insert(key.clone(), dest);
                }
                self.buckets[dest.index()].insert(key, value);
                Ok(true)
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let dest = self.dest_by_key.get(key)?;
        self.buckets[dest.index()].get(key)
    }

    pub fn dest_of(&self, key: &K) -> Option<Dest> {
        self.dest_by_key.get(key).copied()
    }

    pub fn values(&self, dest: Dest) -> impl Iterator<Item = &V> {
        self.buckets[dest.index()].values()
    }

    pub fn len(&self) -> usize {
        self.dest_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dest_by_key.is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

/// Keyed values with a single destination (page layouts, master pages)
#[derive(Debug, Clone)]
pub struct Container<K, V> {
    values: IndexMap<K, V>,
    frozen: bool,
}

impl<K, V> Default for Container<K, V> {
    fn default() -> Self {
        Container {
            values: IndexMap::new(),
            frozen: false,
        }
    }
}

impl<K: Hash + Eq + ToString, V> Container<K, V> {
    pub fn add(&mut self, key: K, value: V, mode: Mode) -> Result<bool> {
        if !self.values.contains_key(&key) {
            if mode == Mode::Update {
                return Err(OdsError::StyleNotFound(key.to_string()));
            }
            if self.frozen {
                return Err(OdsError::StylesFrozen(key.to_string()));
            }
            self.values.insert(key, value);
            return Ok(true);
        }
        if self.frozen || mode == Mode::Create {
            return Ok(false);
        }
        self.values.insert(key, value);
        Ok(true)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.values()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

/// Immutable copy of the registry taken at freeze time, read by the flush thread
#[derive(Debug, Clone, Default)]
pub struct FrozenStyles {
    pub font_faces: Vec<String>,
    pub content_automatic_styles: Vec<ObjectStyle>,
    pub styles_automatic_styles: Vec<ObjectStyle>,
    pub styles_common_styles: Vec<ObjectStyle>,
    pub content_data_styles: Vec<Arc<DataStyle>>,
    pub common_data_styles: Vec<Arc<DataStyle>>,
    pub page_layouts: Vec<Arc<PageLayoutStyle>>,
    pub master_pages: Vec<Arc<MasterPageStyle>>,
}

/// The style registry of one document
#[derive(Debug, Default)]
pub struct StylesContainer {
    object_styles: MultiContainer<StyleKey, ObjectStyle>,
    data_styles: MultiContainer<String, Arc<DataStyle>>,
    page_layouts: Container<String, Arc<PageLayoutStyle>>,
    master_pages: Container<String, Arc<MasterPageStyle>>,
    font_faces: IndexSet<String>,
    child_cell_styles: HashMap<(StyleKey, String), Arc<TableCellStyle>>,
    child_parents: HashMap<StyleKey, Arc<TableCellStyle>>,
    frozen: bool,
}

impl StylesContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `style` in `dest`. Returns `Ok(true)` when the registry changed.
    pub fn register(&mut self, style: ObjectStyle, dest: Dest, mode: Mode) -> Result<bool> {
        validate_style_name(style.name())?;
        let font = style.font_name().map(str::to_string);
        let key = style.key().clone();
        let inserted = self.object_styles.add(key, dest, style, mode)?;
        if inserted {
            if let Some(font) = font {
                self.add_font_face(&font)?;
            }
        }
        Ok(inserted)
    }

    /// Style used in the spreadsheet body: automatic if hidden, common otherwise
    pub fn add_content_style(&mut self, style: impl Into<ObjectStyle>) -> Result<bool> {
        let style = style.into();
        let dest = if style.is_hidden() {
            Dest::ContentAutomaticStyles
        } else {
            Dest::StylesCommonStyles
        };
        self.register(style, dest, Mode::Create)
    }

    /// Style used by page styles: automatic styles go to styles.xml
    pub fn add_styles_style(&mut self, style: impl Into<ObjectStyle>, mode: Mode) -> Result<bool> {
        let style = style.into();
        let dest = if style.is_hidden() {
            Dest::StylesAutomaticStyles
        } else {
            Dest::StylesCommonStyles
        };
        self.register(style, dest, mode)
    }

    pub fn add_data_style(&mut self, data_style: Arc<DataStyle>) -> Result<bool> {
        validate_style_name(data_style.name())?;
        let dest = if data_style.is_hidden() {
            Dest::ContentAutomaticStyles
        } else {
            Dest::StylesCommonStyles
        };
        self.data_styles
            .add(data_style.name().to_string(), dest, data_style, Mode::Create)
    }

    /// Register the layout, the master page and the header/footer text styles
    pub fn add_page_style(&mut self, page_style: &PageStyle, mode: Mode) -> Result<bool> {
        validate_style_name(page_style.name())?;
        validate_style_name(page_style.layout().name())?;
        let mut changed = self.page_layouts.add(
            page_style.layout().name().to_string(),
            Arc::clone(page_style.layout()),
            mode,
        )?;
        changed |= self.master_pages.add(
            page_style.name().to_string(),
            Arc::clone(page_style.master()),
            mode,
        )?;
        for text_style in page_style.text_styles() {
            changed |= self.add_styles_style(text_style, mode)?;
        }
        Ok(changed)
    }

    /// Hidden child of `style` carrying `data_style`, registered once per pair
    pub fn add_child_cell_style(
        &mut self,
        style: &Arc<TableCellStyle>,
        data_style: &Arc<DataStyle>,
    ) -> Result<Arc<TableCellStyle>> {
        let memo_key = (style.key().clone(), data_style.name().to_string());
        if let Some(child) = self.child_cell_styles.get(&memo_key) {
            return Ok(Arc::clone(child));
        }
        self.add_data_style(Arc::clone(data_style))?;
        let child = Arc::new(TableCellStyle::child(style, data_style));
        self.add_content_style(Arc::clone(&child))?;
        self.child_cell_styles.insert(memo_key, Arc::clone(&child));
        self.child_parents
            .insert(child.key().clone(), Arc::clone(style));
        Ok(child)
    }

    /// Style a child cell style was derived from
    pub fn child_parent(&self, child: &StyleKey) -> Option<&Arc<TableCellStyle>> {
        self.child_parents.get(child)
    }

    pub fn add_font_face(&mut self, name: &str) -> Result<bool> {
        if self.font_faces.contains(name) {
            return Ok(false);
        }
        if self.frozen {
            return Err(OdsError::StylesFrozen(format!("font-face@{}", name)));
        }
        self.font_faces.insert(name.to_string());
        Ok(true)
    }

    /// Make the registry read-only for new keys
    pub fn freeze(&mut self) {
        self.object_styles.freeze();
        self.data_styles.freeze();
        self.page_layouts.freeze();
        self.master_pages.freeze();
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn get(&self, key: &StyleKey) -> Option<&ObjectStyle> {
        self.object_styles.get(key)
    }

    pub fn dest_of(&self, key: &StyleKey) -> Option<Dest> {
        self.object_styles.dest_of(key)
    }

    /// Styles of `dest` in first-registered order
    pub fn iter(&self, dest: Dest) -> impl Iterator<Item = &ObjectStyle> {
        self.object_styles.values(dest)
    }

    pub fn data_styles(&self, dest: Dest) -> impl Iterator<Item = &Arc<DataStyle>> {
        self.data_styles.values(dest)
    }

    pub fn len(&self) -> usize {
        self.object_styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_styles.is_empty()
    }

    /// Copy every bucket for the flush thread
    pub fn snapshot(&self) -> Arc<FrozenStyles> {
        let collect = |dest| self.iter(dest).cloned().collect::<Vec<_>>();
        Arc::new(FrozenStyles {
            font_faces: self.font_faces.iter().cloned().collect(),
            content_automatic_styles: collect(Dest::ContentAutomaticStyles),
            styles_automatic_styles: collect(Dest::StylesAutomaticStyles),
            styles_common_styles: collect(Dest::StylesCommonStyles),
            content_data_styles: self
                .data_styles(Dest::ContentAutomaticStyles)
                .cloned()
                .collect(),
            common_data_styles: self
                .data_styles
                .values(Dest::StylesCommonStyles)
                .chain(self.data_styles.values(Dest::StylesAutomaticStyles))
                .cloned()
                .collect(),
            page_layouts: self.page_layouts.values().cloned().collect(),
            master_pages: self.master_pages.values().cloned().collect(),
        })
    }

    #[cfg(test)]
    fn names(&self, dest: Dest) -> Vec<String> {
        self.iter(dest).map(|s| s.name().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{DataStyles, PageSection, TableColumnStyle, TableRowStyle, TextStyle};

    fn cell_style(name: &str) -> Arc<TableCellStyle> {
        TableCellStyle::builder(name).build()
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut styles = StylesContainer::new();
        let a = cell_style("a");
        assert!(styles.add_content_style(Arc::clone(&a)).unwrap());
        assert!(styles.add_content_style(cell_style("b")).unwrap());
        assert!(!styles.add_content_style(Arc::clone(&a)).unwrap());
        assert!(!styles.add_content_style(cell_style("a")).unwrap());

        assert_eq!(styles.names(Dest::StylesCommonStyles), vec!["a", "b"]);
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn test_destination_follows_hidden_flag() {
        let mut styles = StylesContainer::new();
        styles
            .add_content_style(TableCellStyle::builder("h").hidden().build())
            .unwrap();
        styles
            .add_content_style(Arc::new(TableColumnStyle::new("co2")))
            .unwrap();
        styles.add_content_style(cell_style("v")).unwrap();

        assert_eq!(styles.names(Dest::ContentAutomaticStyles), vec!["h", "co2"]);
        assert_eq!(styles.names(Dest::StylesCommonStyles), vec!["v"]);
        assert!(styles.names(Dest::StylesAutomaticStyles).is_empty());
    }

    #[test]
    fn test_same_name_different_family_are_distinct() {
        let mut styles = StylesContainer::new();
        assert!(styles
            .add_content_style(Arc::new(TableColumnStyle::new("x")))
            .unwrap());
        assert!(styles
            .add_content_style(Arc::new(TableRowStyle::new("x")))
            .unwrap());
        assert_eq!(styles.names(Dest::ContentAutomaticStyles), vec!["x", "x"]);
    }

    #[test]
    fn test_update_modes() {
        let mut styles = StylesContainer::new();
        let old = TableCellStyle::builder("s").build();
        let new = TableCellStyle::builder("s").with_font_weight_bold().build();

        let err = styles
            .register(
                ObjectStyle::from(Arc::clone(&new)),
                Dest::StylesCommonStyles,
                Mode::Update,
            )
            .unwrap_err();
        assert!(matches!(err, OdsError::StyleNotFound(ref k) if k == "table-cell@s"));

        styles.add_content_style(Arc::clone(&old)).unwrap();
        styles.add_content_style(cell_style("t")).unwrap();
        assert!(styles
            .register(
                ObjectStyle::from(Arc::clone(&new)),
                Dest::StylesCommonStyles,
                Mode::Update,
            )
            .unwrap());

        // replaced in place
        assert_eq!(styles.names(Dest::StylesCommonStyles), vec!["s", "t"]);
        let key = new.key().clone();
        assert_eq!(styles.get(&key), Some(&ObjectStyle::TableCell(new)));

        // moving to another destination appends there
        let moved = TableCellStyle::builder("s").hidden().build();
        assert!(styles
            .register(
                ObjectStyle::from(moved),
                Dest::ContentAutomaticStyles,
                Mode::CreateOrUpdate,
            )
            .unwrap());
        assert_eq!(styles.names(Dest::StylesCommonStyles), vec!["t"]);
        assert_eq!(styles.names(Dest::ContentAutomaticStyles), vec!["s"]);
        assert_eq!(styles.dest_of(&key), Some(Dest::ContentAutomaticStyles));
    }

    #[test]
    fn test_freeze_fencing() {
        let mut styles = StylesContainer::new();
        let known = cell_style("known");
        styles.add_content_style(Arc::clone(&known)).unwrap();
        styles.freeze();
        assert!(styles.is_frozen());

        // existing key: silent no-op in every mode
        for mode in [Mode::Create, Mode::Update, Mode::CreateOrUpdate] {
            assert!(!styles
                .register(
                    ObjectStyle::from(Arc::clone(&known)),
                    Dest::StylesCommonStyles,
                    mode,
                )
                .unwrap());
        }

        // new key: fatal
        for mode in [Mode::Create, Mode::CreateOrUpdate] {
            let err = styles
                .register(
                    ObjectStyle::from(cell_style("late")),
                    Dest::StylesCommonStyles,
                    mode,
                )
                .unwrap_err();
            assert!(matches!(err, OdsError::StylesFrozen(ref k) if k == "table-cell@late"));
        }
        assert_eq!(styles.names(Dest::StylesCommonStyles), vec!["known"]);
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let mut styles = StylesContainer::new();
        let err = styles.add_content_style(cell_style("bad name")).unwrap_err();
        assert!(matches!(err, OdsError::InvalidStyleName(_)));
        assert!(styles.is_empty());
    }

    #[test]
    fn test_child_cell_style_memoized() {
        let mut styles = StylesContainer::new();
        let data_styles = DataStyles::default();
        let default = TableCellStyle::default_style();
        styles.add_content_style(Arc::clone(&default)).unwrap();

        let child = styles
            .add_child_cell_style(&default, data_styles.boolean())
            .unwrap();
        let again = styles
            .add_child_cell_style(&default, data_styles.boolean())
            .unwrap();
        assert!(Arc::ptr_eq(&child, &again));
        assert!(Arc::ptr_eq(styles.child_parent(child.key()).unwrap(), &default));
        assert!(styles.child_parent(default.key()).is_none());
        assert_eq!(
            styles.names(Dest::ContentAutomaticStyles),
            vec!["Default-_-boolean-data"]
        );
        assert_eq!(
            styles
                .data_styles(Dest::StylesCommonStyles)
                .map(|d| d.name())
                .collect::<Vec<_>>(),
            vec!["boolean-data"]
        );

        // after freeze, known children are still served, new ones are not
        styles.freeze();
        assert!(styles
            .add_child_cell_style(&default, data_styles.boolean())
            .is_ok());
        assert!(matches!(
            styles.add_child_cell_style(&default, data_styles.date()),
            Err(OdsError::StylesFrozen(_))
        ));
    }

    #[test]
    fn test_page_style_embeds_text_styles() {
        let mut styles = StylesContainer::new();
        let title = TextStyle::builder("T1").with_font_name("DejaVu Sans").build();
        let page = PageStyle::builder("Report")
            .with_header(PageSection::new("Report").with_text_style(title))
            .build();

        assert!(styles.add_page_style(&page, Mode::Create).unwrap());
        assert!(!styles.add_page_style(&page, Mode::Create).unwrap());
        assert_eq!(styles.names(Dest::StylesAutomaticStyles), vec!["T1"]);

        // header style changed: CreateOrUpdate replaces it
        let bold = TextStyle::builder("T1").with_font_weight_bold().build();
        let page = PageStyle::builder("Report")
            .with_header(PageSection::new("Report").with_text_style(Arc::clone(&bold)))
            .build();
        assert!(styles.add_page_style(&page, Mode::CreateOrUpdate).unwrap());
        let key = bold.key().clone();
        assert_eq!(styles.get(&key), Some(&ObjectStyle::Text(bold)));

        let snapshot = styles.snapshot();
        assert_eq!(snapshot.page_layouts.len(), 1);
        assert_eq!(snapshot.master_pages.len(), 1);
        assert_eq!(snapshot.font_faces, vec!["DejaVu Sans"]);
    }
}
