use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use actrun_types::{Effect, FieldKind, Msg};

use super::components::component::Component;
use super::components::{ActionFormComponent, CatalogComponent};
use super::theme::theme_helpers as th;
use crate::app::{App, Focus};

/// Root view: catalog on the left, form on the right, hints in the footer.
#[derive(Debug, Default)]
pub struct MainView {
    catalog: CatalogComponent,
    form: ActionFormComponent,
}

impl MainView {
    /// Global keys first, then the focused pane.
    pub fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        app.status = None;
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return vec![Effect::Quit],
            KeyCode::Tab => {
                app.focus_next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.focus_previous();
                return Vec::new();
            }
            KeyCode::Char('r') if control => return app.submit(),
            KeyCode::Char('y') if control => return app.copy_result(),
            KeyCode::Char('l') if control => return vec![Effect::LoadCatalog],
            _ => {}
        }
        match app.focus {
            Focus::Catalog => self.catalog.handle_key_events(app, key),
            Focus::ApiKey | Focus::Field(_) | Focus::RunButton => self.form.handle_key_events(app, key),
        }
    }

    pub fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        let mut effects = app.update(&msg);
        effects.extend(self.catalog.update(app, &msg));
        effects.extend(self.form.update(app, &msg));
        effects
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let background = Paragraph::new("").style(th::panel_style(&*app.ctx.theme));
        frame.render_widget(background, area);

        let [body, footer] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let [left, right] = Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)]).areas(body);
        self.catalog.render(frame, left, app);
        self.form.render(frame, right, app);

        let theme = &*app.ctx.theme;
        let footer_line = match app.status.as_ref() {
            Some(status) => {
                let style = if status.is_error {
                    theme.status_error()
                } else {
                    theme.status_success()
                };
                Line::from(Span::styled(status.message.clone(), style))
            }
            None => Line::from(th::build_hint_spans(theme, hints_for(app))),
        };
        frame.render_widget(Paragraph::new(footer_line).style(Style::default()), footer);
    }
}

fn hints_for(app: &App) -> &'static [(&'static str, &'static str)] {
    let kind = match app.focus {
        Focus::Field(index) => app.action_form.field(index).map(|field| field.kind),
        _ => None,
    };
    match (app.focus, kind) {
        (Focus::Catalog, _) => &[("↑/↓", " Move  "), ("Enter", " Open  "), ("Ctrl-L", " Reload  "), ("Esc", " Quit")],
        (_, Some(FieldKind::Boolean)) => &[("Space", " Toggle  "), ("Tab", " Next  "), ("Ctrl-R", " Run  "), ("Esc", " Quit")],
        (_, Some(FieldKind::Enum)) => &[("←/→", " Choose  "), ("Tab", " Next  "), ("Ctrl-R", " Run  "), ("Esc", " Quit")],
        (_, Some(FieldKind::Object)) => &[("Enter", " Newline  "), ("Tab", " Next  "), ("Ctrl-R", " Run  "), ("Esc", " Quit")],
        (Focus::RunButton, _) => &[("Enter", " Run  "), ("Ctrl-Y", " Copy result  "), ("Tab", " Next  "), ("Esc", " Quit")],
        _ => &[("Tab", " Next  "), ("Shift-Tab", " Previous  "), ("Ctrl-R", " Run  "), ("Ctrl-Y", " Copy result  "), ("Esc", " Quit")],
    }
}
