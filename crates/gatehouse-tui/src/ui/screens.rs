//! Screen bodies: the auth cards and the protected home screen.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use gatehouse_core::auth::{guard, GuardDecision};
use gatehouse_core::forms::Field;
use gatehouse_core::routes::Route;

use crate::app::{App, FormState, Item, Screen, TokenCheck};

use super::render::centered_rect_fixed;
use super::styles;

/// Width of the auth card
const CARD_WIDTH: u16 = 56;

/// Visible characters in a field box
const FIELD_WIDTH: usize = 36;

pub fn render_screen(frame: &mut Frame, app: &App, area: Rect) {
    if guard::decide(&app.screen.route, &app.store.snapshot()) != GuardDecision::Render {
        render_loading(frame, area);
        return;
    }

    if app.screen.route == Route::Home {
        render_home(frame, app, area);
    } else {
        render_card(frame, &app.screen, area);
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(Span::styled("loading...", styles::muted_style()))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, centered_rect_fixed(area.width, 1, area));
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.store.session();
    let focused = app.screen.focused() == Some(Item::SignOut);

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", session.display_label()), styles::title_style()),
            Span::styled(format!("<{}>", session.email), styles::muted_style()),
            Span::raw("   ["),
            Span::styled(button_text("Log out", focused), styles::field_style(focused)),
            Span::raw("]"),
        ]),
        Line::from(""),
        Line::from(Span::raw(format!(" Welcome, {}.", session.display_label()))),
    ];

    let block = Block::default()
        .title(Span::styled(" Home ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_card(frame: &mut Frame, screen: &Screen, area: Rect) {
    let lines = card_lines(screen);
    let height = (lines.len() as u16).saturating_add(2);
    let card = centered_rect_fixed(CARD_WIDTH, height, area);

    frame.render_widget(Clear, card);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), card);
}

fn card_lines(screen: &Screen) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", screen.route.title()), styles::title_style())),
        Line::from(Span::styled(format!(" {}", screen.route.description()), styles::muted_style())),
        Line::from(""),
    ];

    if let Some(ref notice) = screen.notice {
        lines.push(Line::from(Span::styled(
            format!(" {}", notice.text),
            styles::notice_style(notice.kind),
        )));
        lines.push(Line::from(""));
    }

    if let Some(waiting) = waiting_text(screen) {
        lines.push(Line::from(Span::styled(format!(" {}", waiting), styles::muted_style())));
        lines.push(Line::from(""));
    }

    for (index, item) in screen.items().into_iter().enumerate() {
        let focused = index == screen.focus;
        match item {
            Item::Field(field) => {
                if let Some(form) = screen.visible_form() {
                    field_lines(&mut lines, form, field, focused, screen.errors.get(field));
                }
            }
            Item::Submit => {
                if let Some(form) = screen.visible_form() {
                    let label = if screen.pending {
                        form.busy_label()
                    } else {
                        form.submit_label()
                    };
                    lines.push(Line::from(vec![
                        Span::raw("  ["),
                        Span::styled(button_text(label, focused), styles::field_style(focused)),
                        Span::raw("]"),
                    ]));
                    lines.push(Line::from(""));
                }
            }
            Item::Link(label, _) => {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(label, styles::link_style(focused)),
                ]));
            }
            Item::SignOut => {}
        }
    }

    lines
}

/// What the screen is waiting for, if anything.
fn waiting_text(screen: &Screen) -> Option<&'static str> {
    match (&screen.route, screen.token_check) {
        (Route::NewPassword(_), Some(TokenCheck::Checking)) => Some("Checking your reset link..."),
        (Route::ConfirmAccount(_), _) if screen.pending => Some("Confirming your account..."),
        _ => None,
    }
}

fn field_lines(
    lines: &mut Vec<Line<'static>>,
    form: &FormState,
    field: Field,
    focused: bool,
    error: Option<&'static str>,
) {
    let value = form.value(field);
    let shown = if value.is_empty() && !focused {
        Span::styled(
            format!("{:<width$}", field.placeholder(), width = FIELD_WIDTH),
            styles::muted_style(),
        )
    } else {
        let cursor = if focused { "▌" } else { "" };
        Span::styled(
            format!("{:<width$}{}", display_value(field, value), cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        )
    };

    lines.push(Line::from(Span::styled(format!("  {}", field.label()), styles::muted_style())));
    lines.push(Line::from(vec![
        Span::styled("  [", styles::muted_style()),
        shown,
        Span::styled("]", styles::muted_style()),
    ]));
    if let Some(message) = error {
        lines.push(Line::from(Span::styled(format!("  {}", message), styles::error_style())));
    }
}

/// The tail of the value that fits the box, masked for secrets.
fn display_value(field: Field, value: &str) -> String {
    let count = value.chars().count();
    let skip = count.saturating_sub(FIELD_WIDTH - 1);
    if field.is_secret() {
        "*".repeat(count - skip)
    } else {
        value.chars().skip(skip).collect()
    }
}

fn button_text(label: &str, focused: bool) -> String {
    if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    }
}
