use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fin_dashboard::{
    financial_ratios, horizontal_analysis, income_statement_yoy, key_metrics, load_snapshot,
    update_inputs, vertical_analysis, ChartAlignment, EditableInputs, KeyMetrics, Snapshot, BASE_YEAR,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use rusqlite::Connection;
use std::io;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    Depreciation,
    Loans,
    Wacc,
    StoreCount,
    Vertical,
    Horizontal,
    IncomeYoY,
    Ratios,
    Chart,
    Inputs,
}

impl Page {
    pub const ALL: [Page; 13] = [
        Page::BalanceSheet,
        Page::IncomeStatement,
        Page::CashFlow,
        Page::Depreciation,
        Page::Loans,
        Page::Wacc,
        Page::StoreCount,
        Page::Vertical,
        Page::Horizontal,
        Page::IncomeYoY,
        Page::Ratios,
        Page::Chart,
        Page::Inputs,
    ];

    fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }

    pub fn title(&self) -> &str {
        match self {
            Page::BalanceSheet => "Balance Sheet",
            Page::IncomeStatement => "Income Statement",
            Page::CashFlow => "Cash Flow",
            Page::Depreciation => "Depreciation",
            Page::Loans => "Loans",
            Page::Wacc => "WACC",
            Page::StoreCount => "Stores",
            Page::Vertical => "Vertical Analysis",
            Page::Horizontal => "Horizontal Analysis",
            Page::IncomeYoY => "Income YoY",
            Page::Ratios => "Ratios",
            Page::Chart => "Chart",
            Page::Inputs => "Inputs",
        }
    }
}

pub enum LoadState {
    Loading,
    Ready(Box<Snapshot>),
    Failed(String),
}

/// The three editable fields, in form order
pub const INPUT_FIELDS: [(&str, &str); 3] = [
    ("intangible_assets", "Intangible assets"),
    ("shareholder_capital", "Shareholder capital"),
    ("paid_in_capital", "Paid-in capital"),
];

pub struct App {
    conn: Connection,
    alignment: ChartAlignment,
    default_inputs: EditableInputs,
    pub load: LoadState,
    pub current_page: Page,
    pub state: TableState,
    /// First data column shown (the year column always stays)
    pub column_offset: usize,
    pub input_field: usize,
    /// Some while a field is being edited
    pub input_buffer: Option<String>,
    pub message: Option<String>,
}

/// Rows ready to draw: header plus formatted cells
pub struct TableData {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl App {
    pub fn new(conn: Connection, alignment: ChartAlignment, default_inputs: EditableInputs) -> Self {
        Self {
            conn,
            alignment,
            default_inputs,
            load: LoadState::Loading,
            current_page: Page::BalanceSheet,
            state: TableState::default(),
            column_offset: 0,
            input_field: 0,
            input_buffer: None,
            message: None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match &self.load {
            LoadState::Ready(snapshot) => Some(&**snapshot),
            _ => None,
        }
    }

    /// Mark for reload; the next loop iteration draws "Loading" and fetches
    pub fn request_reload(&mut self) {
        self.load = LoadState::Loading;
    }

    pub fn reload(&mut self) {
        self.load = match load_snapshot(&self.conn, self.alignment) {
            Ok(snapshot) => {
                info!(fingerprint = %snapshot.fingerprint(), "dashboard reloaded");
                LoadState::Ready(Box::new(snapshot))
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "snapshot load failed");
                LoadState::Failed(format!("{:#}", e))
            }
        };
        self.reset_selection();
    }

    /// Inputs as stored on the base-year row, or configured defaults
    pub fn current_inputs(&self) -> EditableInputs {
        self.snapshot()
            .and_then(|s| s.balance_sheet().iter().find(|r| r.year == BASE_YEAR))
            .map(EditableInputs::from_base_row)
            .unwrap_or(self.default_inputs)
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.reset_selection();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.column_offset = 0;
        let len = self.row_count();
        self.state.select(if len == 0 { None } else { Some(0) });
    }

    pub fn row_count(&self) -> usize {
        match self.page_table(self.current_page) {
            Some(Ok(data)) => data.rows.len(),
            _ => 0,
        }
    }

    pub fn next(&mut self) {
        if self.current_page == Page::Inputs {
            self.input_field = (self.input_field + 1) % INPUT_FIELDS.len();
            return;
        }

        let len = self.row_count();
        if len == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.current_page == Page::Inputs {
            self.input_field = (self.input_field + INPUT_FIELDS.len() - 1) % INPUT_FIELDS.len();
            return;
        }

        let len = self.row_count();
        if len == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn scroll_right(&mut self) {
        if let Some(Ok(data)) = self.page_table(self.current_page) {
            if self.column_offset + 2 < data.headers.len() {
                self.column_offset += 1;
            }
        }
    }

    pub fn scroll_left(&mut self) {
        self.column_offset = self.column_offset.saturating_sub(1);
    }

    // ------------------------------------------------------------------------
    // Inputs form
    // ------------------------------------------------------------------------

    pub fn begin_edit(&mut self) {
        let inputs = self.current_inputs();
        let value = match self.input_field {
            0 => inputs.intangible_assets,
            1 => inputs.shareholder_capital,
            _ => inputs.paid_in_capital,
        };
        self.input_buffer = Some(value.to_string());
    }

    pub fn cancel_edit(&mut self) {
        self.input_buffer = None;
    }

    /// Write the edited field back and replace the snapshot
    pub fn submit_edit(&mut self) {
        let Some(raw) = self.input_buffer.take() else {
            return;
        };

        let mut inputs = self.current_inputs();
        let (name, label) = INPUT_FIELDS[self.input_field];
        inputs.set_field(name, &raw);

        match update_inputs(&self.conn, &inputs, "tui", self.alignment) {
            Ok(snapshot) => {
                self.message = Some(format!("✓ {} saved", label));
                self.load = LoadState::Ready(Box::new(snapshot));
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "input update failed");
                self.message = Some(format!("✗ {:#}", e));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Page contents
    // ------------------------------------------------------------------------

    /// Table for a page; None for pages that are not tables, Err when a
    /// derivation is missing reference data
    pub fn page_table(&self, page: Page) -> Option<Result<TableData, String>> {
        let snapshot = self.snapshot()?;
        let data = match page {
            Page::BalanceSheet => TableData {
                headers: vec![
                    "Year", "Current assets", "Cash", "Inventory", "Receivables", "Long-term",
                    "Intangible", "Tangible net", "Total assets", "Equity", "Shareholder cap.",
                    "Paid-in cap.", "Retained", "Liabilities", "Loans payable", "Total L+E",
                ],
                rows: snapshot
                    .balance_sheet()
                    .iter()
                    .map(|r| {
                        year_row(r.year, &[
                            r.current_assets, r.cash, r.inventory, r.receivables,
                            r.long_term_assets, r.intangible_assets, r.tangible_assets_net,
                            r.total_assets, r.equity, r.shareholder_capital, r.paid_in_capital,
                            r.retained_earnings, r.liabilities, r.loans_payable,
                            r.total_liabilities_and_equity,
                        ])
                    })
                    .collect(),
            },
            Page::IncomeStatement => TableData {
                headers: vec![
                    "Year", "Units", "Unit price", "Revenue", "Materials", "Depreciation", "Payroll",
                    "Total cost", "EBIT", "Interest", "EBT", "Tax", "Net income",
                ],
                rows: snapshot
                    .income_statement()
                    .iter()
                    .map(|r| {
                        year_row(r.year, &[
                            r.units, r.unit_price, r.revenue, r.materials, r.depreciation_expense,
                            r.payroll, r.total_cost, r.ebit, r.interest_expense, r.ebt,
                            r.income_tax, r.net_income,
                        ])
                    })
                    .collect(),
            },
            Page::CashFlow => TableData {
                headers: vec![
                    "Year", "Net income", "Depreciation", "Receivables", "Materials res.",
                    "Payables", "Net CFO", "Capex", "Net CFI", "Borrowing", "Equity in",
                    "Net CFF", "Net change", "Opening cash", "Closing cash", "FCF",
                ],
                rows: snapshot
                    .cash_flow()
                    .iter()
                    .map(|r| {
                        year_row(r.year, &[
                            r.net_income, r.depreciation, r.receivables_change, r.materials_reserve,
                            r.payables_change, r.net_cfo, r.capex, r.net_cfi, r.borrowing,
                            r.equity_contribution, r.net_cff, r.net_cash_change, r.opening_cash,
                            r.closing_cash, r.free_cash_flow,
                        ])
                    })
                    .collect(),
            },
            Page::Depreciation => TableData {
                headers: vec!["Id", "Asset", "Cost", "Life (years)", "Start year"],
                rows: snapshot
                    .depreciation()
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.asset_name.clone(),
                            format_number(a.cost),
                            a.useful_life_years.to_string(),
                            a.start_year.to_string(),
                        ]
                    })
                    .collect(),
            },
            Page::Loans => TableData {
                headers: vec!["Year", "Ending cash", "Funding need", "Loan", "Rate", "Interest", "Balance"],
                rows: snapshot
                    .loans()
                    .iter()
                    .map(|r| {
                        vec![
                            r.year.to_string(),
                            format_number(r.ending_cash),
                            format_number(r.funding_need),
                            format_number(r.loan_amount),
                            format_percent(r.interest_rate),
                            format_number(r.interest_expense),
                            format_number(r.balance),
                        ]
                    })
                    .collect(),
            },
            Page::Wacc => TableData {
                headers: vec!["Year", "Re", "Rd", "Tc", "E", "D", "V", "WACC"],
                rows: snapshot
                    .wacc()
                    .iter()
                    .map(|r| {
                        vec![
                            r.year.to_string(),
                            format_percent(r.cost_of_equity),
                            format_percent(r.cost_of_debt),
                            format_percent(r.tax_rate),
                            format_number(r.equity_value),
                            format_number(r.debt_value),
                            format_number(r.total_value),
                            format_percent(r.wacc),
                        ]
                    })
                    .collect(),
            },
            Page::StoreCount => TableData {
                headers: vec!["Year", "Stores"],
                rows: snapshot
                    .store_count()
                    .iter()
                    .map(|r| vec![r.year.to_string(), r.stores.to_string()])
                    .collect(),
            },
            Page::Vertical => TableData {
                headers: vec![
                    "Year", "Current assets", "Cash", "Inventory", "Receivables", "Long-term",
                    "Intangible", "Tangible net", "Equity", "Shareholder cap.", "Paid-in cap.",
                    "Retained", "Liabilities", "Loans payable",
                ],
                rows: vertical_analysis(snapshot.balance_sheet())
                    .iter()
                    .map(|r| {
                        percent_row(r.year, &[
                            r.current_assets, r.cash, r.inventory, r.receivables,
                            r.long_term_assets, r.intangible_assets, r.tangible_assets_net,
                            r.equity, r.shareholder_capital, r.paid_in_capital,
                            r.retained_earnings, r.liabilities, r.loans_payable,
                        ])
                    })
                    .collect(),
            },
            Page::Horizontal => match horizontal_analysis(snapshot.balance_sheet()) {
                Ok(rows) => TableData {
                    headers: vec![
                        "Year", "Cash", "Long-term", "Intangible", "Tangible net", "Total assets",
                        "Equity", "Shareholder cap.", "Paid-in cap.", "Liabilities", "Loans payable",
                    ],
                    rows: rows
                        .iter()
                        .map(|r| {
                            percent_row(r.year, &[
                                r.cash, r.long_term_assets, r.intangible_assets,
                                r.tangible_assets_net, r.total_assets, r.equity,
                                r.shareholder_capital, r.paid_in_capital, r.liabilities,
                                r.loans_payable,
                            ])
                        })
                        .collect(),
                },
                Err(e) => return Some(Err(e.to_string())),
            },
            Page::IncomeYoY => TableData {
                headers: vec!["Year", "Units", "Units Δ", "Unit price", "Price Δ", "Revenue", "Revenue Δ"],
                rows: income_statement_yoy(snapshot.income_statement())
                    .iter()
                    .map(|r| {
                        vec![
                            r.row.year.to_string(),
                            format_number(r.row.units),
                            format_percent(r.units_growth),
                            format_number(r.row.unit_price),
                            format_percent(r.unit_price_growth),
                            format_number(r.row.revenue),
                            format_percent(r.revenue_growth),
                        ]
                    })
                    .collect(),
            },
            Page::Ratios => match financial_ratios(snapshot.income_statement(), snapshot.balance_sheet()) {
                Ok(rows) => TableData {
                    headers: vec!["Year", "ROS", "ROA", "ROE", "ROI", "Gross margin"],
                    rows: rows
                        .iter()
                        .map(|r| {
                            percent_row(r.year, &[
                                r.return_on_sales, r.return_on_assets, r.return_on_equity,
                                r.return_on_investment, r.gross_margin,
                            ])
                        })
                        .collect(),
                },
                Err(e) => return Some(Err(e.to_string())),
            },
            Page::Chart => TableData {
                headers: vec!["Year", "Revenue", "Net income", "FCF", "WACC", "Total assets"],
                rows: snapshot
                    .chart_series
                    .iter()
                    .map(|p| {
                        vec![
                            p.year.to_string(),
                            format_number(p.revenue),
                            format_number(p.net_income),
                            format_number(p.free_cash_flow),
                            format_percent(p.wacc),
                            format_number(p.total_assets),
                        ]
                    })
                    .collect(),
            },
            Page::Inputs => return None,
        };
        Some(Ok(data))
    }
}

fn year_row(year: i64, values: &[f64]) -> Vec<String> {
    std::iter::once(year.to_string())
        .chain(values.iter().map(|v| format_number(*v)))
        .collect()
}

fn percent_row(year: i64, values: &[f64]) -> Vec<String> {
    std::iter::once(year.to_string())
        .chain(values.iter().map(|v| format_percent(*v)))
        .collect()
}

/// 1234567.891 -> "1,234,567.89"
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Fraction to percent: 0.1234 -> "12.34%"
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if matches!(app.load, LoadState::Loading) {
            app.reload();
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Editing captures every key until Enter or Esc
        if app.input_buffer.is_some() {
            match key.code {
                KeyCode::Enter => app.submit_edit(),
                KeyCode::Esc => app.cancel_edit(),
                KeyCode::Backspace => {
                    if let Some(buffer) = app.input_buffer.as_mut() {
                        buffer.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(buffer) = app.input_buffer.as_mut() {
                        buffer.push(c);
                    }
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Tab => app.next_page(),
            KeyCode::BackTab => app.previous_page(),
            KeyCode::Char('r') => {
                app.message = None;
                app.request_reload();
            }
            KeyCode::Enter if app.current_page == Page::Inputs && app.snapshot().is_some() => {
                app.begin_edit()
            }
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Right | KeyCode::Char('l') => app.scroll_right(),
            KeyCode::Left | KeyCode::Char('h') => app.scroll_left(),
            KeyCode::Home => {
                if app.row_count() > 0 {
                    app.state.select(Some(0));
                }
            }
            KeyCode::End => {
                let len = app.row_count();
                if len > 0 {
                    app.state.select(Some(len - 1));
                }
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header: page + key metrics
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match &app.load {
        LoadState::Loading => render_notice(f, chunks[1], "Loading…", Color::Yellow),
        LoadState::Failed(message) => {
            let text = format!("Failed to load data:\n\n{}\n\nPress r to retry", message);
            render_notice(f, chunks[1], &text, Color::Red);
        }
        LoadState::Ready(_) => {}
    }

    if app.snapshot().is_some() {
        match app.current_page {
            Page::Inputs => render_inputs(f, chunks[1], app),
            Page::Chart => {
                let content_chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[1]);
                render_chart(f, content_chunks[0], app);
                render_table(f, content_chunks[1], app);
            }
            _ => render_table(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let page = app.current_page;

    let mut tab_spans = vec![
        Span::styled(
            page.previous().title().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" ◀ "),
        Span::styled(
            page.title().to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::raw(" ▶ "),
        Span::styled(page.next().title().to_string(), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("   ({}/{})", page.index() + 1, Page::ALL.len())),
    ];

    let metrics_line = match app.snapshot() {
        Some(snapshot) => metrics_spans(&key_metrics(snapshot)),
        None => vec![Span::styled("-", Style::default().fg(Color::DarkGray))],
    };

    if let Some(snapshot) = app.snapshot() {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("as of {}", snapshot.loaded_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans), Line::from(metrics_line)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn metrics_spans(metrics: &KeyMetrics) -> Vec<Span<'static>> {
    let entries = [
        ("Revenue", metrics.revenue),
        ("Net income", metrics.net_income),
        ("Total assets", metrics.total_assets),
        ("FCF", metrics.free_cash_flow),
    ];

    let mut spans = vec![];
    for (i, (label, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  │  "));
        }
        let color = if value < 0.0 { Color::Red } else { Color::Green };
        spans.push(Span::raw(format!("{}: ", label)));
        spans.push(Span::styled(format_number(value), Style::default().fg(color)));
    }
    spans
}

fn render_notice(f: &mut Frame, area: Rect, text: &str, color: Color) {
    let notice = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(notice, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let data = match app.page_table(app.current_page) {
        Some(Ok(data)) => data,
        Some(Err(message)) => {
            render_notice(f, area, &format!("Cannot derive this view: {}", message), Color::Red);
            return;
        }
        None => return,
    };

    // Year column is pinned; the rest scroll horizontally
    let visible: Vec<usize> = std::iter::once(0)
        .chain((1 + app.column_offset)..data.headers.len())
        .collect();

    let header_cells = visible.iter().map(|&i| {
        Cell::from(data.headers[i]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = data.rows.iter().map(|row| {
        let cells = visible.iter().map(|&i| {
            let text = row.get(i).cloned().unwrap_or_default();
            let color = if text.starts_with('-') { Color::Red } else { Color::White };
            Cell::from(text).style(Style::default().fg(color))
        });
        Row::new(cells).height(1)
    });

    let widths: Vec<Constraint> = visible
        .iter()
        .map(|&i| if i == 0 { Constraint::Length(6) } else { Constraint::Length(16) })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", app.current_page.title())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = app.snapshot() else {
        return;
    };
    let series = &snapshot.chart_series;

    if series.is_empty() {
        render_notice(f, area, "No income statement rows", Color::DarkGray);
        return;
    }

    let revenue: Vec<(f64, f64)> = series.iter().map(|p| (p.year as f64, p.revenue)).collect();
    let net_income: Vec<(f64, f64)> = series.iter().map(|p| (p.year as f64, p.net_income)).collect();
    let free_cash_flow: Vec<(f64, f64)> =
        series.iter().map(|p| (p.year as f64, p.free_cash_flow)).collect();

    let (min_x, max_x) = series
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.year as f64), hi.max(p.year as f64)));
    let (min_y, max_y) = series.iter().fold((0.0_f64, 0.0_f64), |(lo, hi), p| {
        (
            lo.min(p.net_income).min(p.free_cash_flow),
            hi.max(p.revenue).max(p.net_income).max(p.free_cash_flow),
        )
    });

    let datasets = vec![
        Dataset::default()
            .name("Revenue")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&revenue),
        Dataset::default()
            .name("Net income")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&net_income),
        Dataset::default()
            .name("FCF")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&free_cash_flow),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Revenue / Net income / FCF "))
        .x_axis(
            Axis::default()
                .title("Year")
                .bounds([min_x, max_x.max(min_x + 1.0)])
                .labels(vec![
                    Span::raw(format!("{}", min_x)),
                    Span::raw(format!("{}", max_x)),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([min_y, max_y.max(min_y + 1.0)])
                .labels(vec![
                    Span::raw(format_number(min_y)),
                    Span::raw(format_number(max_y)),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_inputs(f: &mut Frame, area: Rect, app: &App) {
    let inputs = app.current_inputs();
    let values = [inputs.intangible_assets, inputs.shareholder_capital, inputs.paid_in_capital];

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Year {} baseline", BASE_YEAR),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, ((_, label), value)) in INPUT_FIELDS.iter().zip(values).enumerate() {
        let selected = i == app.input_field;
        let marker = if selected { "→ " } else { "  " };

        let shown = match (&app.input_buffer, selected) {
            (Some(buffer), true) => format!("{}▏", buffer),
            _ => format_number(value),
        };

        let style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<22}", label), style),
            Span::styled(shown, style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter edit / save  ·  Esc cancel  ·  unparseable values are stored as 0",
        Style::default().fg(Color::DarkGray),
    )));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Inputs "),
    );

    f.render_widget(form, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if app.current_page != Page::Inputs {
        let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
        status_spans.push(Span::styled(
            format!(" Row: {}/{} ", selected, app.row_count()),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::raw(" | "));
    }

    if let Some(message) = &app.message {
        let color = if message.starts_with('✓') { Color::Green } else { Color::Red };
        status_spans.push(Span::styled(message.clone(), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Columns | "));
    status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Reload | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fin_dashboard::{insert_rows, setup_database, BalanceSheetRow, IncomeStatementRow};

    fn app(with_base_year: bool) -> App {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let first = if with_base_year { 0 } else { 1 };
        let balance_sheet: Vec<BalanceSheetRow> = (first..=2)
            .map(|year| BalanceSheetRow {
                year,
                cash: 100.0,
                total_assets: 1000.0,
                intangible_assets: 1000.0,
                ..Default::default()
            })
            .collect();
        insert_rows(&conn, &balance_sheet).unwrap();
        insert_rows(
            &conn,
            &[IncomeStatementRow { year: 1, revenue: 500.0, net_income: 50.0, ..Default::default() }],
        )
        .unwrap();

        let mut app = App::new(conn, ChartAlignment::ByIndex, EditableInputs::default());
        app.reload();
        app
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891), "1,234,567.89");
        assert_eq!(format_number(0.0), "0.00");
        assert_eq!(format_number(-1500.0), "-1,500.00");
        assert_eq!(format_number(999.999), "1,000.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.1234), "12.34%");
        assert_eq!(format_percent(1.0), "100.00%");
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Inputs.next(), Page::BalanceSheet);
        assert_eq!(Page::BalanceSheet.previous(), Page::Inputs);

        let mut page = Page::BalanceSheet;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::BalanceSheet);
    }

    #[test]
    fn test_every_table_page_renders_rows() {
        let app = app(true);

        assert!(app.snapshot().is_some());
        for page in Page::ALL {
            match app.page_table(page) {
                Some(Ok(data)) => {
                    for row in &data.rows {
                        assert_eq!(row.len(), data.headers.len(), "{}", page.title());
                    }
                }
                Some(Err(e)) => panic!("{} failed: {}", page.title(), e),
                None => assert_eq!(page, Page::Inputs),
            }
        }
    }

    #[test]
    fn test_missing_base_year_shows_error_on_horizontal_only() {
        let app = app(false);

        assert!(matches!(app.page_table(Page::Horizontal), Some(Err(_))));
        assert!(matches!(app.page_table(Page::Vertical), Some(Ok(_))));
    }

    #[test]
    fn test_edit_input_writes_back() {
        let mut app = app(true);
        app.current_page = Page::Inputs;
        app.input_field = 2;

        app.begin_edit();
        app.input_buffer = Some("2500".to_string());
        app.submit_edit();

        assert_eq!(app.current_inputs().paid_in_capital, 2500.0);
        assert!(app.input_buffer.is_none());
        assert_eq!(app.message.as_deref(), Some("✓ Paid-in capital saved"));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app(true);

        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }
}
