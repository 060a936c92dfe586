use crate::app::{format_card, App, FocusPane};
use packclick_core::Rarity;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(10),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(root[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(8)])
        .split(middle[0]);

    draw_last_pull(frame, left[0], app);
    draw_skills(frame, left[1], app);
    draw_inventory(frame, middle[1], app);
    draw_events(frame, root[2], app);

    if app.show_help {
        draw_help_popup(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let progress = &session.state.progress;
    let title = format!(
        "Pack Clicker | Focus: {} | ? for help",
        app.focus_label(app.focus)
    );
    let summary = format!(
        "Currency {}  Level {}  XP {}/{}  Skill points {}",
        progress.currency,
        progress.level,
        progress.xp,
        session.xp_needed(),
        progress.skill_points
    );
    let packs = format!(
        "Pack {} ({} cards)  Affordable {}  Cards held {}  Selected {} worth {}",
        session.pack_cost(),
        session.cards_per_pack(),
        session.max_affordable_packs(),
        session.state.inventory.total_cards(),
        session.state.selection.len(),
        app.selection_value()
    );
    let lines = vec![
        Line::from(title.bold()),
        Line::from(summary),
        Line::from(packs),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let block = Block::default().borders(Borders::ALL).title("Overview");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_last_pull(frame: &mut Frame, area: Rect, app: &App) {
    let block = pane_block("Last pull", false);
    if app.last_pull.is_empty() {
        frame.render_widget(
            Paragraph::new("press o to open a pack")
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }
    let lines: Vec<Line<'_>> = app
        .last_pull
        .iter()
        .map(|card| {
            Line::from(Span::styled(
                format_card(card),
                Style::default().fg(rarity_color(card.rarity)),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_skills(frame: &mut Frame, area: Rect, app: &App) {
    let rows = app.skill_rows();
    let points = app.session.state.progress.skill_points;
    let items: Vec<ListItem<'_>> = rows
        .iter()
        .map(|row| {
            let style = if row.unlocked {
                Style::default().fg(Color::Green)
            } else if row.def.cost <= points {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(row.label.clone()).style(style)
        })
        .collect();
    let block = pane_block("Skills", app.focus == FocusPane::Skills);
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if app.focus == FocusPane::Skills && !rows.is_empty() {
        state.select(Some(app.skill_cursor.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_inventory(frame: &mut Frame, area: Rect, app: &App) {
    let rows = app.inventory_rows();
    let inventory = &app.session.state.inventory;
    let items: Vec<ListItem<'_>> = if rows.is_empty() {
        vec![ListItem::new("empty")]
    } else {
        rows.iter()
            .map(|row| {
                let mut style = Style::default();
                if let Some(entry) = inventory.get(&row.key) {
                    style = style.fg(rarity_color(entry.rarity));
                }
                if app.session.state.selection.contains(&row.key) {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                ListItem::new(row.label.clone()).style(style)
            })
            .collect()
    };
    let title = format!(
        "Inventory ({} stacks, worth {})",
        rows.len(),
        app.session.inventory_value()
    );
    let block = pane_block(title.as_str(), app.focus == FocusPane::Inventory);
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(app.inventory_cursor.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = pane_block("Events", app.focus == FocusPane::Events);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_popup(frame: &mut Frame) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("q quit | ? help | tab focus | arrows/jk move"),
        Line::from("o open one pack | m open as many as affordable"),
        Line::from("space toggle stack | a select all | c/esc deselect all"),
        Line::from("s sell selected stacks"),
        Line::from("enter/u unlock the focused skill"),
        Line::from("progress is saved after every change"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::Gray,
        Rarity::Rare => Color::Blue,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Yellow,
    }
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use packclick_core::{EconomyConfig, RngState, Session};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn header_shows_economy_numbers() {
        let app = App::new(
            Session::new(EconomyConfig::default(), RngState::from_seed(1)),
            None,
        );
        let screen = rendered(&app);
        assert!(screen.contains("Currency 100"));
        assert!(screen.contains("Pack 50 (5 cards)"));
        assert!(screen.contains("press o to open a pack"));
    }

    #[test]
    fn help_popup_lists_keys() {
        let mut app = App::new(
            Session::new(EconomyConfig::default(), RngState::from_seed(1)),
            None,
        );
        app.show_help = true;
        assert!(rendered(&app).contains("s sell selected stacks"));
    }

    #[test]
    fn selected_stacks_and_affordable_skills_are_emphasised() {
        let mut app = App::new(
            Session::new(EconomyConfig::default(), RngState::from_seed(1)),
            None,
        );
        app.open_packs(1);
        app.toggle_focused_selection();
        app.session.state.progress.skill_points = 1;

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|frame| draw(frame, &app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let styled = |needle: &str, modifier: Modifier| {
            let width = buffer.area.width as usize;
            let cells = buffer.content();
            cells.chunks(width).any(|line| {
                let text: String = line.iter().map(|cell| cell.symbol()).collect();
                match text.find(needle) {
                    Some(byte) => {
                        let column = text[..byte].chars().count();
                        line[column].modifier.contains(modifier)
                    }
                    None => false,
                }
            })
        };

        let key = app.focused_inventory_key().expect("key");
        let label = app
            .inventory_rows()
            .into_iter()
            .find(|row| row.key == key)
            .map(|row| row.label)
            .expect("row");
        assert!(styled(&label, Modifier::UNDERLINED));
        assert!(styled("Pack Discount", Modifier::BOLD));
    }
}
