use actrun_types::{Action, ActionPackage};
use ratatui::widgets::ListState;

/// One line of the catalog list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogRow {
    Package(usize),
    Action { package: usize, action: usize },
}

impl CatalogRow {
    fn is_action(self) -> bool {
        matches!(self, CatalogRow::Action { .. })
    }
}

/// Packages and actions reported by the server, flattened for display.
///
/// Package headers are rendered but never selected.
#[derive(Debug, Default)]
pub struct CatalogState {
    packages: Vec<ActionPackage>,
    rows: Vec<CatalogRow>,
    pub list_state: ListState,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    pub fn set_packages(&mut self, packages: Vec<ActionPackage>) {
        self.rows = packages
            .iter()
            .enumerate()
            .flat_map(|(package_index, package)| {
                std::iter::once(CatalogRow::Package(package_index)).chain((0..package.actions.len()).map(move |action_index| {
                    CatalogRow::Action {
                        package: package_index,
                        action: action_index,
                    }
                }))
            })
            .collect();
        self.packages = packages;
        self.loading = false;
        self.error = None;
        let first = self.rows.iter().position(|row| row.is_action());
        self.list_state.select(first);
    }

    pub fn set_error(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn package(&self, index: usize) -> Option<&ActionPackage> {
        self.packages.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.iter().all(|package| package.actions.is_empty())
    }

    pub fn select_next(&mut self) {
        let start = self.list_state.selected().map(|index| index + 1).unwrap_or(0);
        if let Some(offset) = self.rows.iter().skip(start).position(|row| row.is_action()) {
            self.list_state.select(Some(start + offset));
        }
    }

    pub fn select_previous(&mut self) {
        let end = self.list_state.selected().unwrap_or(self.rows.len());
        if let Some(index) = self.rows[..end.min(self.rows.len())].iter().rposition(|row| row.is_action()) {
            self.list_state.select(Some(index));
        }
    }

    /// Select an action by name; returns whether it was found.
    pub fn select_by_name(&mut self, package_name: &str, action_name: &str) -> bool {
        let found = self.rows.iter().position(|row| match *row {
            CatalogRow::Action { package, action } => {
                let package = &self.packages[package];
                package.name == package_name && package.actions[action].name == action_name
            }
            CatalogRow::Package(_) => false,
        });
        if found.is_some() {
            self.list_state.select(found);
        }
        found.is_some()
    }

    pub fn selected_action(&self) -> Option<(&ActionPackage, &Action)> {
        match *self.rows.get(self.list_state.selected()?)? {
            CatalogRow::Action { package, action } => {
                let package = self.packages.get(package)?;
                Some((package, package.actions.get(action)?))
            }
            CatalogRow::Package(_) => None,
        }
    }
}
