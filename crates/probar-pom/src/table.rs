//! HTML tables read column by column.

use tracing::info;

use crate::collection::Collection;
use crate::element::{impl_widget, Element, Parent};
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::NodeRef;

/// Header cells, under the table
pub const HEADER_CELLS: &str = "thead > tr > th";
/// Body rows, under the table
pub const BODY_ROWS: &str = "tbody > tr";
/// Data cells, under a body row
pub const ROW_CELLS: &str = "td";

/// A table whose columns are addressed by header title
#[derive(Debug, Clone)]
pub struct Table {
    element: Element,
}

impl_widget!(Table);

impl Table {
    /// Selector used when no locator is given
    pub const DEFAULT_SELECTOR: &'static str = "table";

    /// The first `table` under `parent`
    #[must_use]
    pub fn new(parent: impl Into<Parent>) -> Self {
        Self::with_locator(parent, Locator::css(Self::DEFAULT_SELECTOR))
    }

    /// A table found by `locator` under `parent`
    #[must_use]
    pub fn with_locator(parent: impl Into<Parent>, locator: Locator) -> Self {
        Self {
            element: Element::new(parent, locator),
        }
    }

    /// Wrap an already-found node
    #[must_use]
    pub fn from_node(parent: impl Into<Parent>, node: NodeRef) -> Self {
        Self {
            element: Element::from_node(parent, node),
        }
    }

    /// Every column, left to right.
    ///
    /// Column *i* pairs header cell *i* with data cell *i* of every body
    /// row. The table is read afresh on each call.
    pub fn columns(&self) -> PomResult<Vec<TableColumn>> {
        let headers: Vec<Element> =
            Collection::new(&self.element, Locator::css(HEADER_CELLS)).find_all()?;
        let rows: Vec<Element> =
            Collection::new(&self.element, Locator::css(BODY_ROWS)).find_all()?;
        let row_cells = rows
            .iter()
            .map(|row| Collection::<Element>::new(row, Locator::css(ROW_CELLS)).find_all())
            .collect::<PomResult<Vec<_>>>()?;

        headers
            .into_iter()
            .enumerate()
            .map(|(index, header)| -> PomResult<TableColumn> {
                Ok(TableColumn {
                    title: header.text()?,
                    header,
                    cells: row_cells.iter().map(|cells| cells.get(index).cloned()).collect(),
                })
            })
            .collect()
    }

    /// Header titles, left to right
    pub fn column_titles(&self) -> PomResult<Vec<String>> {
        Ok(self
            .columns()?
            .into_iter()
            .map(|column| column.title)
            .collect())
    }

    /// The column whose header equals `title`, ignoring case
    pub fn column_by_title(&self, title: &str) -> PomResult<TableColumn> {
        let wanted = title.to_lowercase();
        let column = self
            .columns()?
            .into_iter()
            .find(|column| column.title.to_lowercase() == wanted)
            .ok_or_else(|| PomError::ColumnNotFound {
                title: title.to_string(),
            })?;
        info!(table = %self.element.describe(), column = %column.title, "got table column");
        Ok(column)
    }
}

/// One column of a [`Table`]: its header and one cell per body row
#[derive(Debug, Clone)]
pub struct TableColumn {
    title: String,
    header: Element,
    /// `None` where a row is shorter than the header
    cells: Vec<Option<Element>>,
}

impl TableColumn {
    /// Header text, as read when the column was built.
    ///
    /// This is a snapshot: it goes stale if the header re-renders with new
    /// text. Read `header().text()` for the live value.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The header cell
    #[must_use]
    pub fn header(&self) -> &Element {
        &self.header
    }

    /// Number of body rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the table body has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell in the 1-based row `row`
    pub fn cell_by_row_index(&self, row: usize) -> PomResult<&Element> {
        row.checked_sub(1)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_ref)
            .ok_or_else(|| PomError::CellNotFound {
                column: self.title.clone(),
                row,
            })
    }

    /// Text of the cell in the 1-based row `row`
    pub fn cell_text_by_row_index(&self, row: usize) -> PomResult<String> {
        self.cell_by_row_index(row)?.text()
    }
}
