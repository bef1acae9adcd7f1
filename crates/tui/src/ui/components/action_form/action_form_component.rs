use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use actrun_types::{Effect, FieldKind, FormField};

use super::state::allow_numeric_char;
use crate::app::{App, Focus, THROBBER_FRAMES};
use crate::ui::components::common::TextInputState;
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

const INDENT: &str = "  ";
const OBJECT_GUTTER: &str = "│ ";
const MASK: char = '•';

/// Right pane: API key, one control per field, Run button, and result panel.
#[derive(Debug, Default)]
pub struct ActionFormComponent;

impl Component for ActionFormComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return Vec::new();
        }
        match app.focus {
            Focus::Catalog => Vec::new(),
            Focus::ApiKey => handle_api_key_input(app, key),
            Focus::Field(index) => handle_field_input(app, index, key),
            Focus::RunButton => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => app.submit(),
                _ => Vec::new(),
            },
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let pane_focused = app.focus != Focus::Catalog;

        let Some(form) = app.action_form.form() else {
            let message = app
                .action_form
                .load_error
                .clone()
                .unwrap_or_else(|| "Select an action to build its form".to_string());
            let style = if app.action_form.load_error.is_some() {
                theme.status_error()
            } else {
                theme.text_muted_style()
            };
            frame.render_widget(
                Paragraph::new(message)
                    .style(style)
                    .wrap(Wrap { trim: true })
                    .block(th::block(theme, Some("Form"), pane_focused)),
                rect,
            );
            return;
        };

        let result = app.action_form.displayed_result();
        let result_height = result
            .as_ref()
            .map(|result| (result.text.lines().count() as u16).saturating_add(2).clamp(3, (rect.height / 2).max(3)))
            .unwrap_or(0);
        let [form_area, button_area, result_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(3), Constraint::Length(result_height)]).areas(rect);

        let block = th::block(theme, Some(form.action_name.as_str()), pane_focused && app.focus != Focus::RunButton);
        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let layout = build_form_lines(app, theme);
        let visible = inner.height as usize;
        let scroll = layout
            .focus_line
            .map(|line| (line + 1).saturating_sub(visible))
            .unwrap_or(0);
        frame.render_widget(Paragraph::new(layout.lines).scroll((scroll as u16, 0)), inner);

        if let Some((line, column)) = layout.cursor
            && line >= scroll
            && line - scroll < visible
            && (column as u16) < inner.width
        {
            frame.set_cursor_position((inner.x + column as u16, inner.y + (line - scroll) as u16));
        }

        let label = if form.is_busy() {
            format!("{} Running", THROBBER_FRAMES[app.throbber_idx % THROBBER_FRAMES.len()])
        } else {
            "Run".to_string()
        };
        let [button, _] = Layout::horizontal([Constraint::Length(14), Constraint::Min(0)]).areas(button_area);
        th::render_button(frame, button, &label, form.is_submittable(), app.focus == Focus::RunButton, theme);

        if let Some(result) = result {
            let (title, style) = if result.is_error {
                ("Error", theme.status_error())
            } else {
                ("Result", theme.text_primary_style())
            };
            frame.render_widget(
                Paragraph::new(result.text)
                    .style(style)
                    .wrap(Wrap { trim: false })
                    .block(th::block(theme, Some(title), false)),
                result_area,
            );
        }
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    if key.code == KeyCode::Enter {
        app.focus_next();
        return Vec::new();
    }
    if edit_buffer(&mut app.action_form.api_key, key, |_, _| true) {
        return vec![Effect::PersistApiKey(app.action_form.api_key.input().to_string())];
    }
    Vec::new()
}

fn handle_field_input(app: &mut App, index: usize, key: KeyEvent) -> Vec<Effect> {
    let Some(kind) = app.action_form.field(index).map(|field| field.kind) else {
        return Vec::new();
    };
    match kind {
        FieldKind::Boolean => match key.code {
            KeyCode::Char(' ') => app.action_form.toggle_boolean(index),
            KeyCode::Enter => app.focus_next(),
            _ => {}
        },
        FieldKind::Enum => match key.code {
            KeyCode::Right | KeyCode::Char(' ') => app.action_form.cycle_enum(index, true),
            KeyCode::Left => app.action_form.cycle_enum(index, false),
            KeyCode::Enter => app.focus_next(),
            _ => {}
        },
        FieldKind::Number | FieldKind::Integer => {
            if key.code == KeyCode::Enter {
                app.focus_next();
            } else if edit_buffer(&mut app.action_form.editor, key, |buffer, character| {
                allow_numeric_char(buffer, character, kind)
            }) {
                app.action_form.commit_editor(index);
            }
        }
        FieldKind::Text => {
            if key.code == KeyCode::Enter {
                app.focus_next();
            } else if edit_buffer(&mut app.action_form.editor, key, |_, _| true) {
                app.action_form.commit_editor(index);
            }
        }
        FieldKind::Object => {
            let changed = if key.code == KeyCode::Enter {
                app.action_form.editor.insert_char('\n');
                true
            } else {
                edit_buffer(&mut app.action_form.editor, key, |_, _| true)
            };
            if changed {
                app.action_form.commit_editor(index);
            }
        }
    }
    Vec::new()
}

/// Apply a text-editing key to `buffer`; returns whether the text changed.
fn edit_buffer(buffer: &mut TextInputState, key: KeyEvent, accept: impl Fn(&TextInputState, char) -> bool) -> bool {
    match key.code {
        KeyCode::Left => buffer.move_left(),
        KeyCode::Right => buffer.move_right(),
        KeyCode::Home => buffer.move_home(),
        KeyCode::End => buffer.move_end(),
        KeyCode::Backspace => return buffer.backspace(),
        KeyCode::Delete => return buffer.delete(),
        KeyCode::Char(character) if accept(buffer, character) => {
            buffer.insert_char(character);
            return true;
        }
        _ => {}
    }
    false
}

/// Lines of the form body plus where focus and the cursor landed.
struct FormLines {
    lines: Vec<Line<'static>>,
    focus_line: Option<usize>,
    cursor: Option<(usize, usize)>,
}

fn build_form_lines(app: &App, theme: &dyn Theme) -> FormLines {
    let mut out = FormLines {
        lines: Vec::new(),
        focus_line: None,
        cursor: None,
    };
    let state = &app.action_form;

    if let Some(docs) = state.docs() {
        for line in docs.lines() {
            out.lines.push(Line::from(Span::styled(line.to_string(), theme.text_muted_style())));
        }
        out.lines.push(Line::default());
    }

    if app.auth_enabled() {
        let focused = app.focus == Focus::ApiKey;
        out.lines.push(label_line("API key", focused, theme));
        let masked: String = state.api_key.input().chars().map(|_| MASK).collect();
        if focused {
            out.focus_line = Some(out.lines.len());
            let typed = state.api_key.input()[..state.api_key.cursor()].chars().count();
            out.cursor = Some((out.lines.len(), INDENT.len() + typed));
        }
        if masked.is_empty() && !focused {
            out.lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled("(not set)", theme.status_warning()),
            ]));
        } else {
            out.lines.push(Line::from(vec![Span::raw(INDENT), Span::styled(masked, th::input_style(theme, focused))]));
        }
        out.lines.push(Line::default());
    }

    let Some(form) = state.form() else {
        return out;
    };
    for (index, field) in form.fields.iter().enumerate() {
        let focused = app.focus == Focus::Field(index);
        push_field(&mut out, field, focused, &state.editor, theme);
    }
    if app.focus == Focus::RunButton {
        out.focus_line = Some(out.lines.len().saturating_sub(1));
    }
    out
}

fn push_field(out: &mut FormLines, field: &FormField, focused: bool, editor: &TextInputState, theme: &dyn Theme) {
    let depth = field.depth();
    let indent = INDENT.repeat(depth);

    if let Some(title) = field.title.as_deref() {
        let group_indent = INDENT.repeat(depth.saturating_sub(1));
        out.lines.push(Line::from(vec![
            Span::raw(group_indent),
            Span::styled(title.to_string(), theme.accent_primary_style().add_modifier(Modifier::BOLD)),
        ]));
    }

    if focused {
        out.focus_line = Some(out.lines.len());
    }

    match field.kind {
        FieldKind::Boolean => {
            let checkbox = if field.is_checked() { "[x]" } else { "[ ]" };
            out.lines.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(checkbox, th::input_style(theme, focused)),
                Span::raw(" "),
                Span::styled(field.label(), label_style(focused, theme)),
            ]));
        }
        FieldKind::Enum => {
            out.lines.push(indented_label(&indent, field, focused, theme));
            let (text, style) = if field.value.is_empty() {
                ("‹ select ›".to_string(), theme.text_muted_style())
            } else {
                (format!("‹ {} ›", field.value), th::input_style(theme, focused))
            };
            out.lines.push(Line::from(vec![Span::raw(format!("{indent}{INDENT}")), Span::styled(text, style)]));
        }
        FieldKind::Object => {
            out.lines.push(indented_label(&indent, field, focused, theme));
            let first_row = out.lines.len();
            let mut rows: Vec<&str> = field.value.split('\n').collect();
            while rows.len() < FieldKind::OBJECT_ROWS as usize {
                rows.push("");
            }
            let gutter = format!("{indent}{INDENT}{OBJECT_GUTTER}");
            for row in rows {
                out.lines.push(Line::from(vec![
                    Span::styled(gutter.clone(), theme.text_muted_style()),
                    Span::styled(row.to_string(), th::input_style(theme, focused)),
                ]));
            }
            if focused {
                let (line, column) = editor.cursor_line_col();
                out.focus_line = Some(first_row + line);
                out.cursor = Some((first_row + line, gutter.width() + column));
            }
        }
        FieldKind::Number | FieldKind::Integer | FieldKind::Text => {
            out.lines.push(indented_label(&indent, field, focused, theme));
            let prefix = format!("{indent}{INDENT}");
            if focused {
                out.focus_line = Some(out.lines.len());
                out.cursor = Some((out.lines.len(), prefix.width() + editor.cursor_line_col().1));
            }
            let placeholder = match field.kind {
                FieldKind::Integer => "(integer)",
                FieldKind::Number => "(number)",
                _ => "(empty)",
            };
            out.lines.push(value_line(prefix, field.value.clone(), placeholder, focused, theme));
        }
    }

    if let Some(description) = field.description() {
        out.lines.push(Line::from(vec![
            Span::raw(format!("{indent}{INDENT}")),
            Span::styled(description.to_string(), theme.text_muted_style()),
        ]));
    }
}

fn label_style(focused: bool, theme: &dyn Theme) -> Style {
    if focused {
        theme.accent_emphasis_style()
    } else {
        theme.text_secondary_style()
    }
}

fn label_line(label: &str, focused: bool, theme: &dyn Theme) -> Line<'static> {
    Line::from(Span::styled(label.to_string(), label_style(focused, theme)))
}

fn indented_label(indent: &str, field: &FormField, focused: bool, theme: &dyn Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw(indent.to_string()),
        Span::styled(field.label(), label_style(focused, theme)),
    ])
}

fn value_line(prefix: String, value: String, placeholder: &str, focused: bool, theme: &dyn Theme) -> Line<'static> {
    let value = if value.is_empty() && !focused {
        Span::styled(placeholder.to_string(), theme.text_muted_style())
    } else {
        Span::styled(value, th::input_style(theme, focused))
    };
    Line::from(vec![Span::raw(prefix), value])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actrun_api::ActionServerClient;
    use actrun_engine::SubmitController;
    use actrun_types::{Action, ActionPackage, Msg, ServerConfig};
    use actrun_util::{ApiKeyStore, MemoryKeyStore};

    use crate::ui::theme::DraculaTheme;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_form(auth_enabled: bool) -> (App, Arc<MemoryKeyStore>) {
        let key_store = Arc::new(MemoryKeyStore::default());
        let shared: Arc<dyn ApiKeyStore> = key_store.clone();
        let invoker = Arc::new(ActionServerClient::new("http://localhost:9").expect("client"));
        let controller = SubmitController::new(invoker, shared, ServerConfig { auth_enabled });
        let mut app = App::new(Box::new(DraculaTheme::new()), controller, Some(("Pkg".into(), "Act".into())));
        app.update(&Msg::CatalogLoaded(Ok(vec![ActionPackage {
            name: "Pkg".into(),
            actions: vec![Action {
                name: "Act".into(),
                input_schema: r#"{"properties": {
                    "count": {"type": "integer"},
                    "flag": {"type": "boolean"},
                    "meta": {"type": "object"},
                    "size": {"enum": ["S", "M"]}
                }}"#
                .into(),
                docs: None,
            }],
        }])));
        (app, key_store)
    }

    fn type_text(component: &mut ActionFormComponent, app: &mut App, text: &str) -> Vec<Effect> {
        text.chars()
            .flat_map(|character| component.handle_key_events(app, key(KeyCode::Char(character))))
            .collect()
    }

    fn value(app: &App, index: usize) -> String {
        app.action_form.field(index).map(|field| field.value.clone()).unwrap_or_default()
    }

    #[test]
    fn integer_field_ignores_non_digits() {
        let (mut app, _) = app_with_form(false);
        let mut component = ActionFormComponent;
        assert_eq!(app.focus, Focus::Field(0));

        type_text(&mut component, &mut app, "1a2.3");
        assert_eq!(value(&app, 0), "123");
        component.handle_key_events(&mut app, key(KeyCode::Backspace));
        assert_eq!(value(&app, 0), "12");
    }

    #[test]
    fn space_toggles_and_arrows_cycle() {
        let (mut app, _) = app_with_form(false);
        let mut component = ActionFormComponent;

        app.set_focus(Focus::Field(1));
        component.handle_key_events(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(value(&app, 1), "True");

        app.set_focus(Focus::Field(3));
        component.handle_key_events(&mut app, key(KeyCode::Left));
        assert_eq!(value(&app, 3), "M");
        component.handle_key_events(&mut app, key(KeyCode::Right));
        assert_eq!(value(&app, 3), "S");
    }

    #[test]
    fn enter_adds_a_newline_in_object_fields_only() {
        let (mut app, _) = app_with_form(false);
        let mut component = ActionFormComponent;

        app.set_focus(Focus::Field(2));
        type_text(&mut component, &mut app, "{");
        component.handle_key_events(&mut app, key(KeyCode::Enter));
        type_text(&mut component, &mut app, "}");
        assert_eq!(value(&app, 2), "{\n}");
        assert_eq!(app.focus, Focus::Field(2));

        app.set_focus(Focus::Field(0));
        component.handle_key_events(&mut app, key(KeyCode::Enter));
        assert_eq!(app.focus, Focus::Field(1));
    }

    #[test]
    fn editing_clears_a_previous_result() {
        let (mut app, _) = app_with_form(false);
        let mut component = ActionFormComponent;
        app.action_form.apply_result("pkg", "act", actrun_types::RunState::Failed("boom".into()));
        assert!(app.action_form.displayed_result().is_some());

        type_text(&mut component, &mut app, "5");
        assert!(app.action_form.displayed_result().is_none());
    }

    #[test]
    fn backspace_on_an_empty_field_keeps_the_result() {
        let (mut app, _) = app_with_form(false);
        let mut component = ActionFormComponent;
        app.action_form.apply_result("pkg", "act", actrun_types::RunState::Failed("boom".into()));

        component.handle_key_events(&mut app, key(KeyCode::Backspace));
        component.handle_key_events(&mut app, key(KeyCode::Delete));
        assert_eq!(value(&app, 0), "");
        assert!(app.action_form.displayed_result().is_some_and(|result| result.text == "boom"));
    }

    #[test]
    fn api_key_edits_request_persistence() {
        let (mut app, _store) = app_with_form(true);
        let mut component = ActionFormComponent;
        assert_eq!(app.focus, Focus::ApiKey);

        let effects = type_text(&mut component, &mut app, "ab");
        assert_eq!(
            effects,
            vec![Effect::PersistApiKey("a".into()), Effect::PersistApiKey("ab".into())]
        );
    }

    #[test]
    fn run_button_submits() {
        let (mut app, _) = app_with_form(false);
        let mut component = ActionFormComponent;
        app.set_focus(Focus::RunButton);

        let effects = component.handle_key_events(&mut app, key(KeyCode::Enter));
        assert!(matches!(effects.as_slice(), [Effect::RunAction(_)]));
    }
}
