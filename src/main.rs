use std::io;
use std::time::{Duration, Instant};

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
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType,
    Paragraph,
};

use cricvision_terminal::comparison::{ComparisonOutcome, PlayerSummary};
use cricvision_terminal::form_trends::FormOutcome;
use cricvision_terminal::match_state::ScenarioPreset;
use cricvision_terminal::state::{AppState, DashboardContext, InputField, Screen};
use cricvision_terminal::wagon_wheel::bucket_by_runs;

struct App {
    ctx: DashboardContext,
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        let ctx = DashboardContext::init();
        let state = AppState::new(&ctx);
        Self {
            ctx,
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Predict,
            KeyCode::Char('2') => self.state.screen = Screen::Compare,
            KeyCode::Char('3') => self.state.screen = Screen::Form,
            KeyCode::Char('4') => self.state.screen = Screen::WagonWheel,
            KeyCode::Char('g') => self.state.generate_predictions(&self.ctx),
            KeyCode::Char('p') => self.state.apply_preset(ScenarioPreset::Powerplay),
            KeyCode::Char('o') => self.state.apply_preset(ScenarioPreset::MiddleOvers),
            KeyCode::Char('d') => self.state.apply_preset(ScenarioPreset::DeathOvers),
            KeyCode::Char('v') => self.state.cycle_venue(),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.state.screen == Screen::Predict {
                    self.state.focus_next();
                } else {
                    self.state.selector_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.state.screen == Screen::Predict {
                    self.state.focus_prev();
                } else {
                    self.state.selector_prev();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.state.screen == Screen::Predict {
                    self.state.adjust_focused(1);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if self.state.screen == Screen::Predict {
                    self.state.adjust_focused(-1);
                }
            }
            KeyCode::Enter => {
                if self.state.screen == Screen::Predict {
                    self.state.generate_predictions(&self.ctx);
                } else {
                    self.state.choose_selection(&self.ctx);
                }
            }
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Predict => render_predict(frame, chunks[1], &app.state),
        Screen::Compare => render_compare(frame, chunks[1], &app.state),
        Screen::Form => render_form(frame, chunks[1], &app.state),
        Screen::WagonWheel => render_wagon(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer =
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let venue = state
        .venues
        .get(state.venue_selected)
        .map(String::as_str)
        .unwrap_or("Generic Venue");
    format!("CRICVISION TERMINAL | {} | Venue: {}", state.screen.label(), venue)
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Predict => {
            "1-4 Screens | j/k Field | h/l Adjust | g/Enter Predict | p/o/d Scenario | v Venue | ? Help | q Quit"
                .to_string()
        }
        Screen::Compare => {
            "1-4 Screens | j/k Move | Enter Pick (twice) | ? Help | q Quit".to_string()
        }
        Screen::Form | Screen::WagonWheel => {
            "1-4 Screens | j/k Move | Enter Analyze | ? Help | q Quit".to_string()
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_predict(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(40)])
        .split(area);

    render_inputs(frame, columns[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(8)])
        .split(columns[1]);

    render_metrics(frame, right[0], state);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(32),
            Constraint::Percentage(40),
        ])
        .split(right[1]);

    render_gauge(frame, charts[0], state);
    render_phase_chart(frame, charts[1], state);
    render_projection(frame, charts[2], state);
}

fn render_inputs(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines: Vec<Line> = Vec::new();
    for field in InputField::ALL {
        let focused = field == state.focused;
        let marker = if focused { "> " } else { "  " };
        let value = match field {
            InputField::Over => format!("{}", state.inputs.over),
            InputField::Runs => format!("{}", state.inputs.cumulative_runs),
            InputField::Wickets => format!("{}", state.inputs.wickets_down),
            InputField::Balls => format!("{}", state.inputs.balls_remaining),
            InputField::RunRate => format!("{:.1}", state.inputs.current_run_rate),
            InputField::Pressure => format!("{:.1}", state.inputs.pressure_index),
        };
        let style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(
            format!("{marker}{:<18}{value:>8}", field.label()),
            style,
        ));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "p Powerplay  o Middle  d Death",
        Style::default().fg(Color::DarkGray),
    ));

    let panel = Paragraph::new(lines)
        .block(Block::default().title("Match Control").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_metrics(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Predictions").borders(Borders::ALL);

    let text = if let Some(view) = &state.prediction {
        let m = &view.metrics;
        vec![
            Line::raw(format!(
                "Wicket Probability   {:>6.1}%   {}",
                m.wicket_probability,
                m.wicket_risk.label()
            )),
            Line::raw(format!(
                "Expected Runs/Ball   {:>6.2}    ~{:.0} runs/over",
                m.expected_runs_per_ball,
                m.runs_per_over()
            )),
            Line::raw(format!(
                "Boundary Probability {:>6.1}%   {}",
                m.boundary_probability,
                m.boundary_tier.label()
            )),
            Line::raw(format!(
                "Dot Ball Chance      {:>6.1}%",
                m.dot_ball_probability
            )),
            Line::raw(format!(
                "Projected Score      {:>6.0}    at {:.1}/over now",
                m.projected_final_score, view.state.current_run_rate
            )),
            Line::raw(format!(
                "Win Probability      {:>6.1}%",
                m.win_probability
            )),
            Line::raw(format!(
                "Economy Forecast     {:>6.2}",
                m.economy_rate_forecast
            )),
        ]
    } else if let Some(message) = &state.prediction_error {
        vec![
            Line::raw("--"),
            Line::styled(message.clone(), Style::default().fg(Color::Yellow)),
        ]
    } else {
        vec![Line::styled(
            "Awaiting calculation (press g)",
            Style::default().fg(Color::DarkGray),
        )]
    };

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_gauge(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("AI Confidence").borders(Borders::ALL);
    let Some(view) = &state.prediction else {
        frame.render_widget(Paragraph::new("--").block(block), area);
        return;
    };
    let value = view.metrics.confidence_gauge().clamp(0.0, 100.0);
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(value / 100.0)
        .label(format!("{value:.1}%"));
    frame.render_widget(gauge, area);
}

fn render_phase_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Phase Analysis").borders(Borders::ALL);
    let Some(view) = &state.prediction else {
        frame.render_widget(Paragraph::new("--").block(block), area);
        return;
    };

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(5)
        .bar_gap(1)
        .group_gap(2)
        .max(30);

    for rates in &view.phases {
        let style = |base: Color| {
            if rates.current {
                Style::default().fg(base).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let wicket = Bar::default()
            .value(rates.wicket_pct.round() as u64)
            .label(Line::raw(format!("{} W", rates.phase.label())))
            .style(style(Color::Red));
        let boundary = Bar::default()
            .value(rates.boundary_pct.round() as u64)
            .label(Line::raw("B"))
            .style(style(Color::Yellow));
        chart = chart.data(BarGroup::default().bars(&[wicket, boundary]));
    }

    frame.render_widget(chart, area);
}

fn render_projection(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Over-by-Over Projection")
        .borders(Borders::ALL);
    let Some(view) = &state.prediction else {
        frame.render_widget(Paragraph::new("--").block(block), area);
        return;
    };

    let runs: Vec<(f64, f64)> = view
        .projection
        .iter()
        .map(|p| (p.over as f64, p.runs_per_over))
        .collect();
    let risk: Vec<(f64, f64)> = view
        .projection
        .iter()
        .map(|p| (p.over as f64, p.wicket_risk_pct))
        .collect();

    let x_min = runs.first().map(|p| p.0).unwrap_or(0.0);
    let x_max = runs.last().map(|p| p.0).unwrap_or(20.0);
    let y_max = runs
        .iter()
        .chain(risk.iter())
        .map(|p| p.1)
        .fold(10.0_f64, f64::max)
        .ceil();

    let datasets = vec![
        Dataset::default()
            .name("Runs/Over")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&runs),
        Dataset::default()
            .name("Wicket Risk %")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&risk),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Over")
                .bounds([x_min, x_max.max(x_min + 1.0)])
                .labels(vec![
                    Span::raw(format!("{x_min:.0}")),
                    Span::raw(format!("{x_max:.0}")),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{y_max:.0}"))]),
        );
    frame.render_widget(chart, area);
}

fn render_selector(frame: &mut Frame, area: Rect, state: &AppState, title: &str) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if state.batters.is_empty() {
        let empty = Paragraph::new("No player data available")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let start = state
        .selector
        .saturating_sub(inner_height.saturating_sub(1) / 2)
        .min(state.batters.len().saturating_sub(inner_height.max(1)));
    let end = (start + inner_height.max(1)).min(state.batters.len());

    let mut lines = Vec::new();
    for idx in start..end {
        let selected = idx == state.selector;
        let marker = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("{marker}{}", state.batters[idx]), style));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(30)])
        .split(area);

    render_selector(frame, columns[0], state, "Players");

    let block = Block::default().title("Comparison").borders(Borders::ALL);
    let text: Vec<Line> = match &state.comparison {
        Some(ComparisonOutcome::Ready(a, b)) => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(block.inner(columns[1]));
            frame.render_widget(block, columns[1]);
            render_player_card(frame, halves[0], a, Color::Cyan);
            render_player_card(frame, halves[1], b, Color::Yellow);
            return;
        }
        Some(ComparisonOutcome::NoData { missing }) => vec![Line::styled(
            format!("No data found for: {}", missing.join(", ")),
            Style::default().fg(Color::Yellow),
        )],
        None => match &state.compare_first {
            Some(first) => vec![Line::raw(format!(
                "Player 1: {first} - pick Player 2 and press Enter"
            ))],
            None => vec![Line::styled(
                "Select two players to compare",
                Style::default().fg(Color::DarkGray),
            )],
        },
    };
    frame.render_widget(Paragraph::new(text).block(block), columns[1]);
}

fn render_player_card(frame: &mut Frame, area: Rect, summary: &PlayerSummary, accent: Color) {
    let lines = vec![
        Line::styled(
            summary.name.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!("Innings:     {}", summary.innings)),
        Line::raw(format!("Average:     {:.2}", summary.average_runs)),
        Line::raw(format!("Strike Rate: {:.2}", summary.average_strike_rate)),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(30)])
        .split(area);

    render_selector(frame, columns[0], state, "Players");

    let block = Block::default().title("Form Analysis").borders(Borders::ALL);
    let Some((player, outcome)) = &state.form else {
        let empty = Paragraph::new("Select a player and press Enter")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, columns[1]);
        return;
    };

    match outcome {
        FormOutcome::NoData => {
            let msg = Paragraph::new(format!("No data found for {player}"))
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, columns[1]);
        }
        FormOutcome::InsufficientData { innings } => {
            let msg = Paragraph::new(format!(
                "Insufficient data for {player}: {innings} innings (need 5)"
            ))
            .style(Style::default().fg(Color::Yellow))
            .block(block);
            frame.render_widget(msg, columns[1]);
        }
        FormOutcome::Series(series) => {
            let runs: Vec<(f64, f64)> = series
                .runs
                .iter()
                .enumerate()
                .map(|(i, r)| ((i + 1) as f64, *r))
                .collect();
            let rolling: Vec<(f64, f64)> = series
                .rolling_avg
                .as_deref()
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(i, r)| ((i + 1) as f64, *r))
                .collect();

            let y_max = runs.iter().map(|p| p.1).fold(10.0_f64, f64::max).ceil();
            let x_max = runs.len().max(1) as f64;

            let mut datasets = vec![
                Dataset::default()
                    .name("Runs")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Cyan))
                    .data(&runs),
            ];
            if !rolling.is_empty() {
                datasets.push(
                    Dataset::default()
                        .name("5-innings Avg")
                        .marker(symbols::Marker::Dot)
                        .graph_type(GraphType::Line)
                        .style(Style::default().fg(Color::Green))
                        .data(&rolling),
                );
            }

            let chart = Chart::new(datasets)
                .block(Block::default().title(format!("{player} - Recent Form")).borders(Borders::ALL))
                .x_axis(
                    Axis::default()
                        .title("Innings")
                        .bounds([1.0, x_max])
                        .labels(vec![Span::raw("1"), Span::raw(format!("{x_max:.0}"))]),
                )
                .y_axis(
                    Axis::default()
                        .title("Runs")
                        .bounds([0.0, y_max])
                        .labels(vec![Span::raw("0"), Span::raw(format!("{y_max:.0}"))]),
                );
            frame.render_widget(chart, columns[1]);
        }
    }
}

fn render_wagon(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(30)])
        .split(area);

    render_selector(frame, columns[0], state, "Players");

    let Some((player, shots)) = &state.wagon else {
        let empty = Paragraph::new("Select a player and press Enter\n(Synthetic illustration)")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Wagon Wheel").borders(Borders::ALL));
        frame.render_widget(empty, columns[1]);
        return;
    };

    let buckets = bucket_by_runs(shots);
    let points: Vec<(u8, Vec<(f64, f64)>)> = buckets
        .iter()
        .map(|(run, samples)| (*run, samples.iter().map(|s| s.xy()).collect()))
        .collect();

    let datasets: Vec<Dataset> = points
        .iter()
        .map(|(run, data)| {
            let color = match *run {
                6 => Color::Red,
                4 => Color::Yellow,
                _ => Color::Green,
            };
            Dataset::default()
                .name(format!("{run} runs"))
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(color))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!("Wagon Wheel - {player} (synthetic)"))
                .borders(Borders::ALL),
        )
        .x_axis(Axis::default().bounds([-100.0, 100.0]))
        .y_axis(Axis::default().bounds([-100.0, 100.0]));
    frame.render_widget(chart, columns[1]);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "CricVision Terminal - Help",
        "",
        "Screens:",
        "  1            Predictions",
        "  2            Player comparison",
        "  3            Form analysis",
        "  4            Wagon wheel",
        "",
        "Predictions:",
        "  j/k or ↑/↓   Move between inputs",
        "  h/l or ←/→   Adjust focused input",
        "  g / Enter    Generate predictions",
        "  p / o / d    Powerplay / Middle / Death scenario",
        "  v            Cycle venue",
        "",
        "Analysis screens:",
        "  j/k or ↑/↓   Move selector",
        "  Enter        Pick player / run analysis",
        "",
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
