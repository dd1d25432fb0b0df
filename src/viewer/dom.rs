//! DOM surface: builds the grid elements and applies computed layouts.
//!
//! ```text
//! div.cf-table
//!   div.cf-search > input.cf-search-input
//!   div.cf-table-wrapper
//!     div.cf-header-section > table.cf-header-table > thead > tr
//!       th.cf-header-cell[data-key] > span.cf-header-label, span.cf-sort-indicator,
//!                                     div.cf-resize-handle[data-key]
//!     div.cf-body-section > table.cf-body-table > tbody
//!       tr.cf-row[data-row] > td.cf-cell[data-key]
//!   div.cf-pagination
//! ```
//!
//! Only the header and body sections are written by [`GridSurface::apply_layout`];
//! the observed body section's own size is left to the page's CSS.

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlInputElement};

use crate::data::{PageState, SortDirection, SortState};
use crate::layout::{format_px, ContainerMetrics, GridSurface, LastColumnFit, LayoutPlan, TableWidth};
use crate::table::CellContent;
use crate::types::{Column, TableConfig};

const FIT_CLASSES: [&str; 2] = ["has-space", "constrained"];

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in styles {
        let _ = style.set_property(name, value);
    }
}

fn size_cell(cell: &HtmlElement, width: &str) {
    set_styles(
        cell,
        &[("width", width), ("min-width", width), ("max-width", width)],
    );
}

fn mark_fit(cell: &HtmlElement, fit: Option<LastColumnFit>) {
    let classes = cell.class_list();
    for name in FIT_CLASSES {
        let _ = classes.remove_1(name);
    }
    if let Some(fit) = fit {
        let _ = classes.add_1(fit.class_name());
    }
}

/// Browser-backed [`GridSurface`]
pub(crate) struct DomSurface {
    document: Document,
    root: HtmlElement,
    search: HtmlInputElement,
    header_section: HtmlElement,
    header_table: HtmlElement,
    header_row: HtmlElement,
    body_section: HtmlElement,
    body_table: HtmlElement,
    tbody: HtmlElement,
    pagination: HtmlElement,
    header_cells: Vec<HtmlElement>,
    /// Row-major body cells
    body_cells: Vec<Vec<HtmlElement>>,
}

impl DomSurface {
    /// Build the grid skeleton inside `container`
    pub(crate) fn build(container: &HtmlElement) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let root = Self::create(&document, "div", "cf-table")?;
        let search_bar = Self::create(&document, "div", "cf-search")?;
        let search = document
            .create_element("input")?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| JsValue::from_str("input element"))?;
        search.set_class_name("cf-search-input");
        search.set_type("text");
        search_bar.set_hidden(true);

        let wrapper = Self::create(&document, "div", "cf-table-wrapper")?;
        let header_section = Self::create(&document, "div", "cf-header-section")?;
        let header_table = Self::create(&document, "table", "cf-header-table")?;
        let thead = document.create_element("thead")?;
        let header_row = Self::create(&document, "tr", "cf-header-row")?;
        let body_section = Self::create(&document, "div", "cf-body-section")?;
        let body_table = Self::create(&document, "table", "cf-body-table")?;
        let tbody = Self::create(&document, "tbody", "cf-body")?;
        let pagination = Self::create(&document, "div", "cf-pagination")?;
        pagination.set_hidden(true);

        set_styles(&wrapper, &[("display", "flex"), ("flex-direction", "column")]);
        set_styles(&header_section, &[("overflow", "hidden"), ("flex-shrink", "0")]);
        set_styles(&body_section, &[("overflow", "auto"), ("flex", "1")]);
        for table in [&header_table, &body_table] {
            set_styles(
                table,
                &[
                    ("table-layout", "fixed"),
                    ("border-collapse", "collapse"),
                    ("width", "100%"),
                ],
            );
        }

        search_bar.append_child(&search)?;
        thead.append_child(&header_row)?;
        header_table.append_child(&thead)?;
        header_section.append_child(&header_table)?;
        body_table.append_child(&tbody)?;
        body_section.append_child(&body_table)?;
        wrapper.append_child(&header_section)?;
        wrapper.append_child(&body_section)?;
        root.append_child(&search_bar)?;
        root.append_child(&wrapper)?;
        root.append_child(&pagination)?;
        container.append_child(&root)?;

        Ok(Self {
            document,
            root,
            search,
            header_section,
            header_table,
            header_row,
            body_section,
            body_table,
            tbody,
            pagination,
            header_cells: Vec::new(),
            body_cells: Vec::new(),
        })
    }

    fn create(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
        let element = document
            .create_element(tag)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str(tag))?;
        element.set_class_name(class);
        Ok(element)
    }

    pub(crate) fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub(crate) fn search_input(&self) -> &HtmlInputElement {
        &self.search
    }

    pub(crate) fn header_section(&self) -> &HtmlElement {
        &self.header_section
    }

    pub(crate) fn body_section(&self) -> &HtmlElement {
        &self.body_section
    }

    /// Apply the display options of `config`
    pub(crate) fn configure(&self, config: &TableConfig) {
        if let Some(bar) = self.search.parent_element() {
            if let Ok(bar) = bar.dyn_into::<HtmlElement>() {
                bar.set_hidden(!config.show_search);
            }
        }
        self.search.set_placeholder(&config.search_placeholder);
        self.search.set_value("");
        match &config.height {
            Some(height) => set_styles(&self.body_section, &[("max-height", height.as_str())]),
            None => {
                let _ = self.body_section.style().remove_property("max-height");
            }
        }
    }

    /// Rebuild the header row for `columns` at the given formatted widths
    pub(crate) fn render_header(&mut self, columns: &[Column], widths: &[String]) -> Result<(), JsValue> {
        self.header_row.set_inner_html("");
        self.header_cells.clear();
        let _ = Reflect::set(
            self.header_section.as_ref(),
            &JsValue::from_str("scrollLeft"),
            &JsValue::from_f64(0.0),
        );

        for (column, width) in columns.iter().zip(widths) {
            let cell = Self::create(&self.document, "th", "cf-header-cell")?;
            cell.set_attribute("data-key", &column.key)?;
            if column.sortable {
                cell.set_attribute("data-sortable", "")?;
            }
            set_styles(&cell, &[("position", "relative")]);
            size_cell(&cell, width);

            let label = Self::create(&self.document, "span", "cf-header-label")?;
            label.set_text_content(Some(&column.label));
            let indicator = Self::create(&self.document, "span", "cf-sort-indicator")?;
            let handle = Self::create(&self.document, "div", "cf-resize-handle")?;
            handle.set_attribute("data-key", &column.key)?;
            set_styles(
                &handle,
                &[
                    ("position", "absolute"),
                    ("top", "0"),
                    ("right", "0"),
                    ("width", "6px"),
                    ("height", "100%"),
                    ("cursor", "col-resize"),
                ],
            );

            cell.append_child(&label)?;
            cell.append_child(&indicator)?;
            cell.append_child(&handle)?;
            self.header_row.append_child(&cell)?;
            self.header_cells.push(cell);
        }
        Ok(())
    }

    /// Mark the sorted header cell
    pub(crate) fn show_sort(&self, sort: Option<&SortState>) {
        for cell in &self.header_cells {
            let key = cell.get_attribute("data-key").unwrap_or_default();
            let direction = sort.filter(|s| s.key == key).map(|s| s.direction);
            let (aria, arrow) = match direction {
                Some(SortDirection::Ascending) => ("ascending", "\u{25b2}"),
                Some(SortDirection::Descending) => ("descending", "\u{25bc}"),
                None => ("none", ""),
            };
            let _ = cell.set_attribute("aria-sort", aria);
            if let Ok(Some(indicator)) = cell.query_selector(".cf-sort-indicator") {
                indicator.set_text_content(Some(arrow));
            }
        }
    }

    /// Rebuild the body rows; `rows` holds one content per column in order
    pub(crate) fn render_body(
        &mut self,
        keys: &[String],
        rows: &[Vec<CellContent>],
        widths: &[String],
    ) -> Result<(), JsValue> {
        self.tbody.set_inner_html("");
        self.body_cells.clear();

        for (index, contents) in rows.iter().enumerate() {
            let row = Self::create(&self.document, "tr", "cf-row")?;
            row.set_attribute("data-row", &index.to_string())?;
            let mut cells = Vec::with_capacity(contents.len());
            for ((key, content), width) in keys.iter().zip(contents).zip(widths) {
                let cell = Self::create(&self.document, "td", "cf-cell")?;
                cell.set_attribute("data-key", key)?;
                size_cell(&cell, width);
                match content {
                    CellContent::Text(text) => cell.set_text_content(Some(text)),
                    CellContent::Custom(html) => cell.set_inner_html(html),
                }
                row.append_child(&cell)?;
                cells.push(cell);
            }
            self.tbody.append_child(&row)?;
            self.body_cells.push(cells);
        }
        Ok(())
    }

    /// Rebuild the pagination bar
    pub(crate) fn render_pagination(
        &self,
        enabled: bool,
        page: PageState,
        size_options: &[usize],
    ) -> Result<(), JsValue> {
        self.pagination.set_inner_html("");
        self.pagination.set_hidden(!enabled);
        if !enabled {
            return Ok(());
        }

        for &size in size_options {
            let button = Self::create(&self.document, "button", "cf-page-size")?;
            button.set_attribute("data-page-size", &size.to_string())?;
            button.set_text_content(Some(&size.to_string()));
            if size == page.page_size {
                let _ = button.class_list().add_1("active");
            }
            self.pagination.append_child(&button)?;
        }

        let first = if page.length == 0 {
            0
        } else {
            page.page_index * page.page_size + 1
        };
        let last = ((page.page_index + 1) * page.page_size).min(page.length);
        let range = Self::create(&self.document, "span", "cf-page-range")?;
        range.set_text_content(Some(&format!("{first} \u{2013} {last} of {}", page.length)));
        self.pagination.append_child(&range)?;

        for (nav, label, disabled) in [
            ("previous", "\u{2039}", page.page_index == 0),
            ("next", "\u{203a}", page.page_index + 1 >= page.page_count),
        ] {
            let button = Self::create(&self.document, "button", "cf-page-nav")?;
            button.set_attribute("data-page-nav", nav)?;
            button.set_text_content(Some(label));
            if disabled {
                button.set_attribute("disabled", "")?;
            }
            self.pagination.append_child(&button)?;
        }
        Ok(())
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        let _ = self.root.class_list().toggle_with_force("cf-loading", loading);
    }

    pub(crate) fn set_resizing(&self, resizing: bool) {
        let _ = self.root.class_list().toggle_with_force("cf-resizing", resizing);
    }

    /// Detach the grid from the page
    pub(crate) fn remove(&mut self) {
        self.root.remove();
        self.header_cells.clear();
        self.body_cells.clear();
    }
}

impl GridSurface for DomSurface {
    fn body_metrics(&self) -> Option<ContainerMetrics> {
        if self.header_cells.is_empty() || !self.body_section.is_connected() {
            return None;
        }
        Some(
            ContainerMetrics::new(
                self.body_section.client_width() as f32,
                self.body_section.client_height() as f32,
            )
            .with_scroll_height(self.body_section.scroll_height() as f32),
        )
    }

    fn apply_layout(&mut self, plan: &LayoutPlan) {
        let last = plan.widths.len().saturating_sub(1);
        let fit_for = |index: usize| (index == last).then_some(plan.last_column_fit);

        for (index, entry) in plan.widths.iter().enumerate() {
            if let Some(cell) = self.header_cells.get(index) {
                size_cell(cell, &entry.formatted);
            }
        }
        for row in &self.body_cells {
            for (index, entry) in plan.widths.iter().enumerate() {
                if let Some(cell) = row.get(index) {
                    size_cell(cell, &entry.formatted);
                    mark_fit(cell, fit_for(index));
                }
            }
        }

        let _ = self
            .header_section
            .class_list()
            .toggle_with_force("has-vertical-scrollbar", plan.has_vertical_scrollbar);
        let gutter = if plan.has_vertical_scrollbar {
            format_px(plan.container_width - plan.available_width)
        } else {
            "0".to_string()
        };
        set_styles(&self.header_section, &[("padding-right", gutter.as_str())]);

        let table_width = match plan.table_width {
            TableWidth::Fill => "100%".to_string(),
            TableWidth::Fixed(width) => format_px(width),
        };
        for table in [&self.header_table, &self.body_table] {
            set_styles(table, &[("width", table_width.as_str())]);
        }
    }

    fn body_scroll_left(&self) -> Option<f64> {
        Reflect::get(self.body_section.as_ref(), &JsValue::from_str("scrollLeft"))
            .ok()
            .and_then(|value| value.as_f64())
    }

    fn set_header_scroll_left(&mut self, offset: f64) {
        let _ = Reflect::set(
            self.header_section.as_ref(),
            &JsValue::from_str("scrollLeft"),
            &JsValue::from_f64(offset),
        );
    }
}
