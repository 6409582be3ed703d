mod render;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use serde::Serialize;
use stairs_solver_core::{
    Position,
    board::Board,
    command::Action,
    demo,
    layout::parse_layout,
    map::Terrain,
    search::{GoalDistance, Solution, Solver, SolverConfig},
};
use std::{
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::render::Glyph;

#[derive(Parser, Debug)]
#[command(version, about = "Finds a way to the stairs of a dungeon floor", long_about = None)]
struct Args {
    /// Layout file to solve. Defaults to the built-in demo floor.
    #[arg(short, long, value_name = "LAYOUT_FILE")]
    puzzle: Option<PathBuf>,

    /// Give up after expanding this many boards
    #[arg(long, value_name = "N")]
    max_expansions: Option<usize>,

    /// Log search progress every N expansions (0 disables)
    #[arg(long, value_name = "N", default_value_t = SolverConfig::default().progress_interval)]
    progress_interval: usize,

    /// How to present the solution
    #[arg(short, long, value_enum, default_value_t = Output::Plain)]
    output: Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Print every board along the solution
    Plain,
    /// Print the action list as JSON
    Json,
    /// Replay the solution in the terminal
    Tui,
}

/// Machine-readable summary of a solution.
#[derive(Serialize)]
struct Report<'a> {
    actions: Vec<&'a Action>,
    expanded: usize,
    discovered: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = SolverConfig {
        max_expansions: args.max_expansions,
        progress_interval: args.progress_interval,
    };

    let (board, heuristic) = load_floor(args.puzzle.as_deref(), args.output)?;

    let solution = Solver::with_heuristic(heuristic, config)
        .solve(&board)
        .inspect_err(|err| tracing::error!(%err, "no solution"))
        .context("search failed")?;

    match args.output {
        Output::Plain => print_plain(&solution),
        Output::Json => {
            let report = Report {
                actions: solution.actions().collect(),
                expanded: solution.stats.expanded,
                discovered: solution.stats.discovered,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Output::Tui => {
            let mut terminal = setup_terminal()?;
            let mut app = App::new(solution);
            let result = run_app(&mut terminal, &mut app);
            restore_terminal(&mut terminal)?;
            result?;
        }
    }
    Ok(())
}

/// Reads the floor to solve. The demo floor comes with its own tuning.
fn load_floor(puzzle: Option<&Path>, output: Output) -> Result<(Board, GoalDistance)> {
    match puzzle {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read layout file {}", path.display()))?;
            let board = parse_layout(&text)
                .with_context(|| format!("failed to load layout {}", path.display()))?;
            tracing::info!(puzzle = %path.display(), ?output, "loaded layout");
            Ok((board, GoalDistance::default()))
        }
        None => {
            tracing::info!(?output, "using the built-in demo floor");
            Ok((demo::demo_board(), demo::demo_heuristic()))
        }
    }
}

fn print_plain(solution: &Solution) {
    println!("{}", render::render_text(&solution.initial));
    for (turn, step) in solution.steps.iter().enumerate() {
        println!();
        println!("{}. {}", turn + 1, step.action);
        println!("{}", render::render_text(&step.board));
    }
    println!();
    println!(
        "solved in {} steps ({} boards expanded, {} discovered)",
        solution.len(),
        solution.stats.expanded,
        solution.stats.discovered
    );
}

struct App {
    solution: Solution,
    /// Number of steps applied to the initial board.
    shown: usize,
    paused: bool,
    should_quit: bool,
}

impl App {
    fn new(solution: Solution) -> Self {
        App {
            solution,
            shown: 0,
            paused: false,
            should_quit: false,
        }
    }

    fn board(&self) -> &Board {
        match self.shown {
            0 => &self.solution.initial,
            n => &self.solution.steps[n - 1].board,
        }
    }

    fn forward(&mut self) {
        self.shown = (self.shown + 1).min(self.solution.len());
    }

    fn back(&mut self) {
        self.shown = self.shown.saturating_sub(1);
    }

    /// Advances the replay unless paused.
    fn tick(&mut self) {
        if !self.paused {
            self.forward();
        }
    }

    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the replay loop until the user quits.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(600);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    KeyCode::Char(' ') => app.paused = !app.paused,
                    KeyCode::Right => {
                        app.paused = true;
                        app.forward();
                    }
                    KeyCode::Left => {
                        app.paused = true;
                        app.back();
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Area for the map
            Constraint::Percentage(35), // Area for inventory and characters
            Constraint::Percentage(10), // Area for status/help
        ])
        .split(frame.area());

    let board = app.board();
    let title = match app.shown {
        0 => format!("Start (0/{})", app.solution.len()),
        n => format!("{} ({}/{})", app.solution.steps[n - 1].action, n, app.solution.len()),
    };
    render_map(frame, main_layout[0], board, &title);

    let legend: Vec<ListItem> = render::legend(board)
        .into_iter()
        .map(ListItem::new)
        .collect();
    let legend_widget =
        List::new(legend).block(Block::default().borders(Borders::ALL).title("Board"));
    frame.render_widget(legend_widget, main_layout[1]);

    let status = if board.solved() { "Solved. " } else { "" };
    let help_text = Paragraph::new(format!(
        "{}Space pauses, arrows step, 'q' or 'Esc' quits.",
        status
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

fn glyph_style(glyph: Glyph) -> Style {
    match glyph {
        Glyph::Protagonist => Style::default().fg(Color::Red).bold(),
        Glyph::Character(_) => Style::default().fg(Color::Magenta).bold(),
        Glyph::Item(_) => Style::default().fg(Color::Yellow),
        Glyph::Stairs => Style::default().fg(Color::Green).bold(),
        Glyph::Trap(_) => Style::default().fg(Color::LightRed),
        Glyph::Terrain(Terrain::Water) => Style::default().fg(Color::Blue),
        Glyph::Terrain(Terrain::Wall | Terrain::UnbreakableWall) => {
            Style::default().fg(Color::DarkGray)
        }
        Glyph::Terrain(Terrain::Floor) => Style::default(),
    }
}

/// Renders the board map onto the frame.
fn render_map(frame: &mut Frame, area: Rect, board: &Board, title: &str) {
    let terrain = &board.level().terrain;
    let mut lines: Vec<Line> = Vec::with_capacity(terrain.height());
    for y in 0..terrain.height() {
        let spans: Vec<Span> = (0..terrain.width())
            .map(|x| {
                let glyph = Glyph::at(board, Position::new(x as i32, y as i32));
                Span::styled(glyph.symbol().to_string(), glyph_style(glyph))
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(map_paragraph, area);
}
