use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph, Wrap};

use actrun_types::Effect;

use super::state::CatalogRow;
use crate::app::{App, Focus};
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

/// Left pane listing packages and their actions.
#[derive(Debug, Default)]
pub struct CatalogComponent;

impl Component for CatalogComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.catalog.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.catalog.select_previous(),
            KeyCode::Enter | KeyCode::Right => app.open_selected_action(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Actions"), app.focus == Focus::Catalog);

        let placeholder = if app.catalog.loading {
            Some(Paragraph::new("Loading actions…").style(theme.text_muted_style()))
        } else if let Some(error) = app.catalog.error.as_deref() {
            Some(Paragraph::new(error.to_string()).style(theme.status_error()))
        } else if app.catalog.is_empty() {
            Some(Paragraph::new("No actions available").style(theme.text_muted_style()))
        } else {
            None
        };
        if let Some(paragraph) = placeholder {
            frame.render_widget(paragraph.wrap(Wrap { trim: true }).block(block), rect);
            return;
        }

        let items: Vec<ListItem> = app
            .catalog
            .rows()
            .iter()
            .filter_map(|row| match *row {
                CatalogRow::Package(index) => {
                    let package = app.catalog.package(index)?;
                    Some(ListItem::new(Line::from(Span::styled(
                        package.name.clone(),
                        theme.text_secondary_style().add_modifier(Modifier::BOLD),
                    ))))
                }
                CatalogRow::Action { package, action } => {
                    let action = app.catalog.package(package)?.actions.get(action)?;
                    Some(ListItem::new(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(action.name.clone(), theme.text_primary_style()),
                    ])))
                }
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(theme.selection_style().add_modifier(Modifier::BOLD));
        frame.render_stateful_widget(list, rect, &mut app.catalog.list_state);
    }
}
