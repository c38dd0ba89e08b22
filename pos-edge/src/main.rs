use std::io::{self, BufRead, Write};

use anyhow::Context;
use pos_edge::{
    PosError, SessionController, StartupSource, TableView, print_banner,
    setup_environment,
};
use shared::models::{BadgeState, TableId};

const HELP: &str = "\
Commands:
  tables               list all tables
  select <id>          select a table (number or 'togo')
  add <name> <price>   add an item to the selected table
  remove <index>       remove an item by position
  pay                  mark the selected table as paid
  close                clear the selected table
  newday               reset daily revenue to $0.00
  show                 show the selected table
  retry                retry saving after a failure
  reload               read the saved state again after a load failure
  discard              drop the unread saved state and save the current one
  help                 show this help
  quit                 exit";

fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 工作目录, 日志)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(tables = config.tables.len(), environment = %config.environment, "POS terminal starting...");

    // 2. 打开存储并恢复会话
    let db_path = config.db_path();
    let (mut session, source) = SessionController::open_file(&config.tables, &db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    report_startup(&source);

    println!("Daily revenue: ${:.2}", session.revenue());
    println!("{HELP}");

    // 3. 命令循环
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print_prompt(&session)?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        if let Err(e) = run_command(&mut session, line, &mut lines) {
            print_notice(&e);
        }
    }

    if session.has_unsaved_changes() {
        tracing::warn!("Exiting with unsaved changes");
        println!("Warning: latest changes were not saved.");
    }
    Ok(())
}

fn run_command(
    session: &mut SessionController,
    line: &str,
    input: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(), PosError> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd {
        "help" => println!("{HELP}"),
        "tables" => {
            for view in session.tables() {
                let marker = if session.selected() == Some(view.id) { "*" } else { " " };
                println!(
                    "{marker} {:<14} {:<12} ${:.2}",
                    view.label, view.status_text, view.total
                );
            }
        }
        "select" => {
            let id: TableId = rest.parse()?;
            session.select_table(id)?;
            show_current(session);
        }
        "add" => {
            let (name, price) = rest
                .rsplit_once(' ')
                .ok_or_else(|| PosError::invalid_item("usage: add <name> <price>"))?;
            let price: f64 = price
                .parse()
                .map_err(|_| PosError::invalid_item(format!("invalid price: {price}")))?;
            session.add_item(name, price)?;
            show_current(session);
        }
        "remove" => {
            let Ok(index) = rest.parse::<usize>() else {
                println!("Usage: remove <index>");
                return Ok(());
            };
            session.remove_item(index)?;
            show_current(session);
        }
        "pay" => {
            let amount = session.mark_current_paid()?;
            println!("Paid ${amount:.2}. Daily revenue: ${:.2}", session.revenue());
            show_current(session);
        }
        "close" => {
            if session.selected().is_none() {
                return Err(PosError::NoTableSelected);
            }
            if confirm("Close and clear this table?", input) {
                session.close_current_table()?;
                show_current(session);
            }
        }
        "newday" => {
            if confirm(
                "Are you sure you want to start a new day? This will reset the Daily Revenue to $0.00.",
                input,
            ) {
                session.start_new_day()?;
                println!("Daily revenue: ${:.2}", session.revenue());
            }
        }
        "show" => show_current(session),
        "retry" => {
            session.retry_save()?;
            println!("State saved.");
        }
        "reload" => {
            let source = session.retry_load()?;
            report_startup(&source);
            println!("Daily revenue: ${:.2}", session.revenue());
        }
        "discard" => {
            if !session.is_save_blocked() {
                println!("Saved state is loaded; nothing to discard.");
            } else if confirm(
                "Overwrite the saved state that could not be read with the current floor?",
                input,
            ) {
                session.accept_reset()?;
                println!("State saved.");
            }
        }
        other => println!("Unknown command: {other} (type 'help')"),
    }
    Ok(())
}

fn confirm(question: &str, input: &mut impl Iterator<Item = io::Result<String>>) -> bool {
    print!("{question} [y/N] ");
    let _ = io::stdout().flush();
    matches!(
        input.next(),
        Some(Ok(answer)) if matches!(answer.trim(), "y" | "Y" | "yes")
    )
}

fn show_current(session: &SessionController) {
    match session.current_view() {
        Some(view) => print_table(&view),
        None => println!("No table selected."),
    }
}

fn print_table(view: &TableView) {
    let badge = match view.badge {
        BadgeState::Hidden => "",
        BadgeState::Unpaid => " [UNPAID]",
        BadgeState::Paid => " [PAID]",
    };
    println!("== {} ({}){badge}", view.label, view.status_text);
    if view.orders.is_empty() {
        println!("   No items added yet...");
    }
    for (index, line) in view.orders.iter().enumerate() {
        println!("   {index:>2}. {:<24} ${:.2}", line.name, line.price);
    }
    println!("   Total: ${:.2}", view.total);
}

fn print_prompt(session: &SessionController) -> io::Result<()> {
    let unsaved = if session.has_unsaved_changes() { " UNSAVED" } else { "" };
    let table = session
        .selected()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".into());
    print!("[{table} | ${:.2}{unsaved}] > ", session.revenue());
    io::stdout().flush()
}

fn print_notice(err: &PosError) {
    if err.is_soft() {
        println!("{err}");
    } else {
        let code = err.code();
        println!("Error {code} ({}: {}): {err}", err.category().name(), code.message());
    }
}

fn report_startup(source: &StartupSource) {
    match source {
        StartupSource::Fresh => println!("Starting with a fresh floor."),
        StartupSource::Restored(report) => {
            println!("Restored saved state.");
            if !report.is_clean() {
                println!(
                    "Note: {} table(s) added, {} dropped, {} repaired{}.",
                    report.created.len(),
                    report.dropped.len(),
                    report.repaired.len(),
                    if report.revenue_reset { ", revenue reset" } else { "" }
                );
            }
        }
        StartupSource::Fallback(err @ PosError::PersistenceFailure(_)) => {
            println!("Warning: {err}. Starting with default tables.");
            println!("Saving is paused. Use 'reload' to try again or 'discard' to overwrite.");
        }
        StartupSource::Fallback(err) => {
            println!("Warning: {err}. Starting with default tables.");
        }
    }
}
