//! Award detail form parser
//!
//! An award form is a table layout. Each leaf cell (one without a nested
//! table) may carry a mapped field either as its own id or through the first
//! `input`, `textarea` or `select` it contains. Values are collected per
//! element id and projected into field mapping order.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::compile_selector;
use super::error::ParsingResult;
use crate::domain::mapping::FieldMapping;
use crate::domain::record::{FieldRecord, FieldValue};

/// Where a mapped value lives inside a table cell
#[derive(Debug, Clone, Copy)]
pub enum FieldSource<'a> {
    /// The cell itself carries the mapped id
    Cell(ElementRef<'a>),
    /// Single-line input
    Input(ElementRef<'a>),
    /// Multi-line text
    TextArea(ElementRef<'a>),
    /// Selection list
    Select(ElementRef<'a>),
}

impl FieldSource<'_> {
    /// Extract the value this source holds
    pub fn value(&self, selected_option: &Selector) -> Option<FieldValue> {
        match self {
            Self::Cell(cell) => cell_value(cell),
            Self::Input(input) => input_value(input),
            Self::TextArea(textarea) => textarea_value(textarea),
            Self::Select(select) => select_value(select, selected_option),
        }
    }
}

/// Concatenated text as written; whitespace-only text counts as absent
fn element_text(element: &ElementRef) -> Option<FieldValue> {
    let text = element.text().collect::<String>();
    if text.trim().is_empty() {
        None
    } else {
        Some(FieldValue::Text(text))
    }
}

fn cell_value(cell: &ElementRef) -> Option<FieldValue> {
    element_text(cell)
}

/// The `value` attribute when present, otherwise the checked state
fn input_value(input: &ElementRef) -> Option<FieldValue> {
    let element = input.value();
    match element.attr("value") {
        Some(value) if !value.trim().is_empty() => Some(FieldValue::Text(value.to_string())),
        _ if element.attr("checked").is_some() => Some(FieldValue::Flag(true)),
        _ => None,
    }
}

fn textarea_value(textarea: &ElementRef) -> Option<FieldValue> {
    element_text(textarea)
}

/// Text of the selected option, only when that option carries a non-empty value
fn select_value(select: &ElementRef, selected_option: &Selector) -> Option<FieldValue> {
    let option = select.select(selected_option).next()?;
    let has_value = option
        .value()
        .attr("value")
        .is_some_and(|value| !value.trim().is_empty());
    if has_value { element_text(&option) } else { None }
}

/// Parser for award detail pages
pub struct AwardFormParser {
    cell_selector: Selector,
    table_selector: Selector,
    input_selector: Selector,
    textarea_selector: Selector,
    select_selector: Selector,
    selected_option_selector: Selector,
}

impl AwardFormParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            cell_selector: compile_selector("td")?,
            table_selector: compile_selector("table")?,
            input_selector: compile_selector("input")?,
            textarea_selector: compile_selector("textarea")?,
            select_selector: compile_selector("select")?,
            selected_option_selector: compile_selector("option[selected]")?,
        })
    }

    /// Decide which element of a leaf cell carries a mapped field.
    ///
    /// Checked in order: the cell id, then the first input, textarea and
    /// select of the cell. Returns `None` for container cells and cells
    /// without a mapped id.
    pub fn classify_cell<'a>(
        &self,
        cell: ElementRef<'a>,
        mapping: &FieldMapping,
    ) -> Option<(String, FieldSource<'a>)> {
        if cell.select(&self.table_selector).next().is_some() {
            return None;
        }

        let mapped = |element: &ElementRef<'a>| {
            element
                .value()
                .id()
                .filter(|id| mapping.contains_id(id))
                .map(str::to_string)
        };

        if let Some(id) = mapped(&cell) {
            return Some((id, FieldSource::Cell(cell)));
        }

        let candidates: [(&Selector, fn(ElementRef<'a>) -> FieldSource<'a>); 3] = [
            (&self.input_selector, FieldSource::Input),
            (&self.textarea_selector, FieldSource::TextArea),
            (&self.select_selector, FieldSource::Select),
        ];

        candidates.into_iter().find_map(|(selector, source)| {
            let element = cell.select(selector).next()?;
            mapped(&element).map(|id| (id, source(element)))
        })
    }

    /// Extract a record from a parsed detail page.
    ///
    /// Returns `None` when no mapped field has a value.
    pub fn parse(&self, html: &Html, mapping: &FieldMapping) -> Option<FieldRecord> {
        let mut values: HashMap<String, Option<FieldValue>> = HashMap::new();

        for cell in html.select(&self.cell_selector) {
            if let Some((id, source)) = self.classify_cell(cell, mapping) {
                values.insert(id, source.value(&self.selected_option_selector));
            }
        }

        let projected = mapping
            .element_ids()
            .map(|id| values.get(id).cloned().flatten())
            .collect::<Vec<_>>();

        let record = FieldRecord::from_values(projected);
        if record.is_none() {
            debug!("No mapped field had a value ({} cells matched)", values.len());
        }
        record
    }

    /// Parse raw HTML and extract a record
    pub fn parse_document(&self, body: &str, mapping: &FieldMapping) -> Option<FieldRecord> {
        let html = Html::parse_document(body);
        self.parse(&html, mapping)
    }
}
