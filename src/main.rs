use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};
use tracing::{error, info, warn};

use winplace_terminal::config::AppConfig;
use winplace_terminal::features::MODEL_COLUMNS;
use winplace_terminal::form::{FormState, FormView, slider_line};
use winplace_terminal::importance::ImportanceRow;
use winplace_terminal::logging::init_logging;
use winplace_terminal::model::XgbModel;
use winplace_terminal::stats::{Field, Preset};

const SLIDER_WIDTH: usize = 10;
// Border, cursor prefix and `slider_line` at SLIDER_WIDTH.
const SIDEBAR_WIDTH: u16 = 43;
// Bars are integers; importances are fractions.
const IMPORTANCE_SCALE: f32 = 10_000.0;

struct App<'a> {
    state: FormState,
    model: &'a XgbModel,
    should_quit: bool,
}

impl<'a> App<'a> {
    fn new(model: &'a XgbModel, preset: Preset) -> Self {
        Self {
            state: FormState::new(preset),
            model,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.adjust_selected(-1.0, false),
            KeyCode::Char('l') | KeyCode::Right => self.state.adjust_selected(1.0, false),
            KeyCode::Char('H') => self.state.adjust_selected(-1.0, true),
            KeyCode::Char('L') => self.state.adjust_selected(1.0, true),
            KeyCode::Tab | KeyCode::Char('t') => self.state.cycle_preset(),
            KeyCode::Char('1') => self.state.select_preset(Preset::Aggressive),
            KeyCode::Char('2') => self.state.select_preset(Preset::Balanced),
            KeyCode::Char('3') => self.state.select_preset(Preset::Passive),
            KeyCode::Char('p') | KeyCode::Enter => {
                self.state.predict(self.model);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let config = AppConfig::load();
    let _log_guard = init_logging(&config.log_dir);

    // A missing or unreadable model is fatal; fail before touching the terminal.
    let model = XgbModel::load(&config.model_path, config.importance)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;
    let schema_warning = model.schema_mismatch(&MODEL_COLUMNS);
    if let Some(msg) = &schema_warning {
        warn!(%msg, "model schema differs from form columns");
    }

    let mut app = App::new(&model, config.default_preset);
    app.state.push_log(format!(
        "[INFO] Model loaded: {} trees, {} features",
        model.num_trees(),
        model.num_feature()
    ));
    if let Some(msg) = schema_warning {
        app.state.push_log(format!("[WARN] Schema mismatch: {msg}"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    info!("terminal started");
    let res = run_app(&mut terminal, &mut app, config.tick_rate);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(%err, "run loop failed");
    }
    res.context("terminal loop failed")
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let view = app.state.view(app.model);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    render_banner(frame, chunks[1], &view);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
        .split(chunks[2]);

    render_sidebar(frame, columns[0], &app.state);
    render_main(frame, columns[1], &app.state, &view);

    let footer = Paragraph::new(footer_text()).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &FormState) -> String {
    format!(
        " PUBG WIN PROBABILITY | winPlacePerc predictor | Player type: {}",
        state.preset.label()
    )
}

fn footer_text() -> String {
    "j/k Select | h/l Adjust | H/L Step | Tab Preset | p Predict | ? Help | q Quit".to_string()
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &FormState) {
    let mut lines = Vec::with_capacity(Field::ALL.len() + 2);
    let presets = Preset::ALL
        .iter()
        .map(|p| {
            if *p == state.preset {
                format!("<{}>", p.label())
            } else {
                p.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    lines.push(Line::from(format!("Type: {presets}")));
    lines.push(Line::from(""));

    for (idx, field) in Field::ALL.iter().enumerate() {
        let text = slider_line(*field, state.stats.get(*field), SLIDER_WIDTH);
        if idx == state.selected {
            lines.push(Line::styled(
                format!("> {text}"),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ));
        } else {
            lines.push(Line::from(format!("  {text}")));
        }
    }

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .title("Player Match Stats Input")
            .borders(Borders::ALL),
    );
    frame.render_widget(sidebar, area);
}

fn render_banner(frame: &mut Frame, area: Rect, view: &FormView) {
    let banner = match view.banner() {
        Some(text) => Paragraph::new(text).style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        None => Paragraph::new("Press p to predict").style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(
        banner
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Prediction").borders(Borders::ALL)),
        area,
    );
}

fn render_main(frame: &mut Frame, area: Rect, state: &FormState, view: &FormView) {
    // The chart keeps one row per column; derived values and the console take what is left.
    let chart_height = view.importances.len() as u16 + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(chart_height),
            Constraint::Min(0),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(importance_chart(&view.importances), rows[0]);

    let derived = Paragraph::new(derived_text(view))
        .block(Block::default().title("Derived Features").borders(Borders::ALL));
    frame.render_widget(derived, rows[1]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn derived_text(view: &FormView) -> String {
    let f = &view.features;
    [
        format!("Total Distance:     {:.1}", f.total_distance),
        format!("Kill Ratio:         {:.6}", f.kill_ratio),
        format!("Kills per Distance: {:.6}", f.kills_per_distance),
        format!("Headshot Rate:      {:.3}", f.headshot_rate),
    ]
    .join("\n")
}

fn importance_chart(rows: &[ImportanceRow]) -> BarChart<'static> {
    let bars: Vec<Bar<'static>> = rows
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.feature.clone()))
                .value((row.importance.max(0.0) * IMPORTANCE_SCALE).round() as u64)
                .text_value(format!("{:.3}", row.importance))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    BarChart::default()
        .block(
            Block::default()
                .title("Feature Importance (XGBoost)")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
}

fn console_text(state: &FormState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "PUBG Win Probability - Help",
        "",
        "Controls:",
        "  j/k or ↑/↓   Select stat",
        "  h/l or ←/→   Adjust by small step",
        "  H/L          Adjust by large step",
        "",
        "Player type:",
        "  Tab / t      Next preset",
        "  1 / 2 / 3    Aggressive / Balanced / Passive",
        "",
        "  p / Enter    Predict win probability",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
