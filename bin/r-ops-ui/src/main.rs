//! ---
//! ops_section: "12-operator-console"
//! ops_subsection: "binary"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Terminal dashboard for live fleet telemetry."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Sparkline};
use ratatui::{Frame, Terminal};

use r_ops_api::{ApiClient, ReactorGateway};
use r_ops_common::config::AppConfig;
use r_ops_common::settings::SettingsStore;
use r_ops_common::version::VersionInfo;
use r_ops_logs::LogEvent;
use r_ops_poller::{
    new_registry, FleetSnapshot, FleetTelemetryTask, LogsTask, Poller, PollerMetrics,
    ReactorSnapshot, ReactorTelemetryTask,
};

const CONFIG_CANDIDATES: &[&str] = &["r-ops.toml", "configs/r-ops.toml"];

#[derive(Parser, Debug)]
#[command(
    author,
    disable_version_flag = true,
    about = "Live reactor fleet dashboard in a terminal UI",
    propagate_version = false
)]
struct Cli {
    /// Configuration file (defaults to r-ops.toml, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the upstream API base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Override the upstream API key
    #[arg(long)]
    api_key: Option<String>,
    /// Draw refresh interval in milliseconds
    #[arg(long, default_value_t = 250)]
    refresh: u64,

    /// Print extended version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,
}

/// Detail pollers follow the selected reactor; a selection change tears the
/// old pair down and spawns a fresh pair.
struct DetailPollers {
    reactor_id: String,
    telemetry: Poller<ReactorSnapshot>,
    logs: Poller<Vec<LogEvent>>,
}

struct App {
    gateway: Arc<ApiClient>,
    settings: Arc<SettingsStore>,
    metrics: PollerMetrics,
    telemetry_interval: Duration,
    logs_interval: Duration,

    fleet_poller: Poller<FleetSnapshot>,
    logs_poller: Poller<Vec<LogEvent>>,
    detail: Option<DetailPollers>,

    fleet: Option<FleetSnapshot>,
    fleet_logs: Vec<LogEvent>,
    detail_snapshot: Option<ReactorSnapshot>,
    detail_logs: Vec<LogEvent>,

    selected: usize,
    notice: Option<String>,
}

impl App {
    fn new(
        gateway: Arc<ApiClient>,
        settings: Arc<SettingsStore>,
        metrics: PollerMetrics,
        telemetry_interval: Duration,
        logs_interval: Duration,
    ) -> Self {
        let fleet_poller = Poller::spawn_with_metrics(
            FleetTelemetryTask::new(gateway.clone()),
            telemetry_interval,
            Some(metrics.clone()),
        );
        let logs_poller = Poller::spawn_with_metrics(
            LogsTask::new(gateway.clone()),
            logs_interval,
            Some(metrics.clone()),
        );
        Self {
            gateway,
            settings,
            metrics,
            telemetry_interval,
            logs_interval,
            fleet_poller,
            logs_poller,
            detail: None,
            fleet: None,
            fleet_logs: Vec::new(),
            detail_snapshot: None,
            detail_logs: Vec::new(),
            selected: 0,
            notice: None,
        }
    }

    /// Pull the latest published snapshots and keep the detail pollers
    /// aligned with the current selection. Failed cycles publish nothing,
    /// so the previous values simply remain on screen.
    fn sync(&mut self) {
        if let Some(snapshot) = self.fleet_poller.latest() {
            if self.selected >= snapshot.reactors.len() {
                self.selected = snapshot.reactors.len().saturating_sub(1);
            }
            self.fleet = Some(snapshot);
        }
        if let Some(feed) = self.logs_poller.latest() {
            self.fleet_logs = feed;
        }

        let selected_id = self
            .fleet
            .as_ref()
            .and_then(|fleet| fleet.reactors.get(self.selected))
            .map(|reactor| reactor.id.clone());
        match selected_id {
            Some(id) => {
                let stale = self
                    .detail
                    .as_ref()
                    .map_or(true, |detail| detail.reactor_id != id);
                if stale {
                    self.detail_snapshot = None;
                    self.detail_logs = Vec::new();
                    self.detail = Some(DetailPollers {
                        reactor_id: id.clone(),
                        telemetry: Poller::spawn_with_metrics(
                            ReactorTelemetryTask::new(self.gateway.clone(), id.clone()),
                            self.telemetry_interval,
                            Some(self.metrics.clone()),
                        ),
                        logs: Poller::spawn_with_metrics(
                            LogsTask::scoped(self.gateway.clone(), id),
                            self.logs_interval,
                            Some(self.metrics.clone()),
                        ),
                    });
                }
            }
            None => {
                self.detail = None;
                self.detail_snapshot = None;
                self.detail_logs = Vec::new();
            }
        }

        if let Some(detail) = &self.detail {
            if let Some(snapshot) = detail.telemetry.latest() {
                self.detail_snapshot = Some(snapshot);
            }
            if let Some(feed) = detail.logs.latest() {
                self.detail_logs = feed;
            }
        }
    }

    fn reactor_count(&self) -> usize {
        self.fleet
            .as_ref()
            .map_or(0, |fleet| fleet.reactors.len())
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.reactor_count() {
            self.selected += 1;
        }
    }

    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn selected_reactor_id(&self) -> Option<String> {
        self.detail.as_ref().map(|d| d.reactor_id.clone())
    }

    async fn toggle_unit(&mut self) {
        let next = self.settings.temp_unit().toggled();
        match self.gateway.set_temperature_unit(next).await {
            Ok(_) => {
                self.notice = match self.settings.set_temp_unit(next) {
                    Ok(()) => Some(format!("temperature unit set to {}", next)),
                    Err(err) => Some(format!("unit switched but not persisted: {}", err)),
                };
            }
            Err(err) => {
                self.notice = Some(format!("failed to switch unit: {}", err));
            }
        }
    }

    async fn toggle_coolant(&mut self) {
        let Some(id) = self.selected_reactor_id() else {
            return;
        };
        let current = self
            .detail_snapshot
            .as_ref()
            .map(|snapshot| snapshot.sample.coolant)
            .unwrap_or_default();
        let next = current.toggled();
        self.notice = match self.gateway.set_coolant(&id, next).await {
            Ok(dto) => Some(format!("coolant on {} is now {}", id, dto.coolant)),
            Err(err) => Some(format!("failed to toggle coolant: {}", err)),
        };
    }

    async fn start_selected(&mut self) {
        let Some(id) = self.selected_reactor_id() else {
            return;
        };
        self.notice = match self.gateway.start_reactor(&id).await {
            Ok(()) => Some(format!("reactor {} started", id)),
            Err(err) => Some(format!("failed to start {}: {}", id, err)),
        };
    }

    async fn shutdown_selected(&mut self) {
        let Some(id) = self.selected_reactor_id() else {
            return;
        };
        self.notice = match self.gateway.controlled_shutdown(&id).await {
            Ok(()) => Some(format!("controlled shutdown initiated for {}", id)),
            Err(err) => Some(format!("failed to shut down {}: {}", id, err)),
        };
    }

    async fn stop_pollers(self) {
        self.fleet_poller.shutdown().await;
        self.logs_poller.shutdown().await;
        if let Some(detail) = self.detail {
            detail.telemetry.shutdown().await;
            detail.logs.shutdown().await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(&[path])?,
        None => AppConfig::load(CONFIG_CANDIDATES)?,
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(api_key) = cli.api_key {
        config.api.api_key = api_key;
    }
    config.validate()?;

    let gateway = Arc::new(ApiClient::from_config(&config.api)?);
    let settings = Arc::new(SettingsStore::load(&config.settings.path)?);
    let registry = new_registry();
    let metrics = PollerMetrics::new(&registry)?;

    let app = App::new(
        gateway,
        settings,
        metrics,
        config.poll.telemetry_interval,
        config.poll.logs_interval,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run_app(&mut terminal, app, Duration::from_millis(cli.refresh.max(50))).await;
    cleanup_terminal(&mut terminal)?;
    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
    Ok(())
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        app.sync();
        terminal.draw(|frame| draw_ui(frame, &mut app))?;
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_input(&mut app, key).await? {
                        break;
                    }
                }
                Event::Resize(_, _) => {
                    // redraw with new geometry
                }
                _ => {}
            }
        }
    }
    app.stop_pollers().await;
    Ok(())
}

async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('u') | KeyCode::Char('U') => app.toggle_unit().await,
        KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_coolant().await,
        KeyCode::Char('s') | KeyCode::Char('S') => app.start_selected().await,
        KeyCode::Char('x') | KeyCode::Char('X') => app.shutdown_selected().await,
        _ => {}
    };
    Ok(false)
}

fn draw_ui(frame: &mut Frame, app: &mut App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(frame.size());

    draw_header(frame, app, layout[0]);
    draw_fleet_chart(frame, app, layout[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(layout[2]);
    draw_reactor_list(frame, app, body[0]);
    draw_detail(frame, app, body[1]);

    let mut help =
        "↑/↓ or j/k select  u unit  c coolant  s start  x shutdown  q quit".to_owned();
    if let Some(notice) = &app.notice {
        help = format!("{}  |  {}", help, notice);
    }
    let footer = Paragraph::new(help).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, layout[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let unit = app.settings.temp_unit();
    let (avg, total) = match &app.fleet {
        Some(fleet) => (
            fleet
                .average_temperature
                .map(|avg| format!("{:.1}°{}", avg, unit))
                .unwrap_or_else(|| "--".to_owned()),
            format!("{:.2} GW", fleet.total_output_mw / 1000.0),
        ),
        None => ("--".to_owned(), "--".to_owned()),
    };
    let title = Line::from(vec![
        Span::styled(
            app.settings.plant_name(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   avg temp "),
        Span::styled(avg, Style::default().fg(Color::Yellow)),
        Span::raw("   total output "),
        Span::styled(total, Style::default().fg(Color::Yellow)),
    ]);
    let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_fleet_chart(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let values: Vec<u64> = app
        .fleet
        .as_ref()
        .map(|fleet| {
            fleet
                .temperature_history
                .values()
                .iter()
                .map(|value| value.max(0.0).round() as u64)
                .collect()
        })
        .unwrap_or_default();
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Average Temperature"),
        )
        .data(&values)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, area);
}

fn draw_reactor_list(frame: &mut Frame, app: &mut App, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = match &app.fleet {
        Some(fleet) if !fleet.reactors.is_empty() => fleet
            .reactors
            .iter()
            .map(|reactor| {
                ListItem::new(format!(
                    "{}  {}",
                    reactor.id,
                    app.settings.display_name(&reactor.id, &reactor.name)
                ))
            })
            .collect(),
        Some(_) => vec![ListItem::new(Line::from("(no reactors listed)"))],
        None => vec![ListItem::new(Line::from("loading fleet..."))],
    };
    let mut state = ListState::default();
    if app.reactor_count() > 0 {
        state.select(Some(app.selected));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Reactors"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let unit = app.settings.temp_unit();
    let stats: Vec<Line> = match &app.detail_snapshot {
        Some(snapshot) => vec![
            Line::from(format!(
                "temperature: {:.1}°{}",
                snapshot.sample.temperature, unit
            )),
            Line::from(format!("output:      {:.1} MW", snapshot.sample.output_mw)),
            Line::from(format!("fuel:        {:.1}%", snapshot.sample.fuel_percent)),
            Line::from(format!("state:       {}", snapshot.sample.state)),
            Line::from(format!("rods:        {}", snapshot.sample.rod_state)),
            Line::from(format!("coolant:     {}", snapshot.sample.coolant)),
        ],
        None => vec![Line::from("waiting for telemetry...")],
    };
    let title = app
        .selected_reactor_id()
        .unwrap_or_else(|| "no reactor selected".to_owned());
    let detail = Paragraph::new(stats).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, Style::default().fg(Color::Cyan))),
    );
    frame.render_widget(detail, panes[0]);

    let feed = if app.detail.is_some() {
        &app.detail_logs
    } else {
        &app.fleet_logs
    };
    let lines: Vec<Line> = if feed.is_empty() {
        vec![Line::from("(no activity logged)")]
    } else {
        feed.iter()
            .map(|event| {
                Line::from(vec![
                    Span::styled(event.time.clone(), Style::default().fg(Color::DarkGray)),
                    Span::raw("  "),
                    Span::raw(event.message.clone()),
                ])
            })
            .collect()
    };
    let logs = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Activity Log"),
    );
    frame.render_widget(logs, panes[1]);
}
