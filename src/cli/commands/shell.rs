//! `catadm shell <entity>` - interactive list session
//!
//! Reads one command per line from stdin and drives a [`ListController`].
//! The current page is redrawn after every change; failures are shown as
//! alerts and leave the session running.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::{self, BufRead, Write};

use crate::cli::helpers::{alert, connect, count_label, load_config};
use crate::cli::table::{schema_columns, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CatalogApi, EditSession, FieldValue, ListController, Reconciled};
use crate::entities::Entity;

#[derive(clap::Args, Debug)]
pub struct ShellArgs {
    /// Entity to browse
    #[arg(value_enum)]
    pub entity: Entity,
}

/// One line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Redraw the current page
    Show,
    Next,
    Prev,
    Page(usize),
    /// Change the search term; no argument clears it
    Search(String),
    New,
    Edit(String),
    Set { field: String, value: String },
    /// Print the open draft
    Draft,
    Save,
    Cancel,
    Delete(String),
    Help,
    Quit,
}

/// Parse one input line. Blank lines map to `None`.
pub fn parse_command(line: &str) -> std::result::Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let needs_arg = |what: &str| -> std::result::Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {} <{}>", verb, what))
        } else {
            Ok(rest.to_string())
        }
    };

    let cmd = match verb.to_lowercase().as_str() {
        "ls" | "list" | "show" => ShellCommand::Show,
        "n" | "next" => ShellCommand::Next,
        "p" | "prev" => ShellCommand::Prev,
        "page" | "go" => {
            let page = needs_arg("number")?;
            match page.parse::<usize>() {
                Ok(n) if n > 0 => ShellCommand::Page(n),
                _ => return Err(format!("not a page number: '{}'", page)),
            }
        }
        "search" | "/" => ShellCommand::Search(rest.to_string()),
        "new" | "add" => ShellCommand::New,
        "edit" | "e" => ShellCommand::Edit(needs_arg("id")?),
        "set" => {
            let assignment = needs_arg("FIELD=VALUE")?;
            match assignment.split_once('=') {
                Some((field, value)) if !field.trim().is_empty() => ShellCommand::Set {
                    field: field.trim().to_string(),
                    value: value.to_string(),
                },
                _ => return Err(format!("expected FIELD=VALUE, got '{}'", assignment)),
            }
        }
        "draft" => ShellCommand::Draft,
        "save" | "w" => ShellCommand::Save,
        "cancel" => ShellCommand::Cancel,
        "delete" | "rm" => ShellCommand::Delete(needs_arg("id")?),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(Some(cmd))
}

pub async fn run(args: ShellArgs, global: &GlobalOpts) -> Result<()> {
    let schema = args.entity.schema();
    let config = load_config(global);
    let api = connect(&config)?;
    let mut list = ListController::load(&api, schema).await.into_diagnostic()?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    println!("{}", style(schema.title).bold().underlined());
    draw(&list, format)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", prompt(&list));
        io::stdout().flush().into_diagnostic()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.into_diagnostic()?;

        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{} {}", style("✗").red().bold(), msg);
                continue;
            }
        };
        if cmd == ShellCommand::Quit {
            break;
        }
        execute(&mut list, cmd, format).await?;
    }

    Ok(())
}

fn prompt<A: CatalogApi + ?Sized>(list: &ListController<'_, A>) -> String {
    let schema = list.schema();
    match list.session().target() {
        Some(target) => format!(
            "{}[{} {}]>",
            style(schema.plural).cyan(),
            style("editing").yellow(),
            target
        ),
        None => format!("{}>", style(schema.plural).cyan()),
    }
}

/// Run one command. Operation failures are alerted, never fatal; only
/// terminal I/O errors end the session.
async fn execute<A>(list: &mut ListController<'_, A>, cmd: ShellCommand, format: OutputFormat) -> Result<()>
where
    A: CatalogApi + ?Sized,
{
    let schema = list.schema();
    match cmd {
        ShellCommand::Show => draw(list, format)?,
        ShellCommand::Next => {
            list.next_page();
            draw(list, format)?;
        }
        ShellCommand::Prev => {
            list.prev_page();
            draw(list, format)?;
        }
        ShellCommand::Page(n) => {
            list.go_to_page(n);
            draw(list, format)?;
        }
        ShellCommand::Search(term) => {
            list.set_search(&term);
            draw(list, format)?;
        }
        ShellCommand::New => match list.begin_create() {
            Ok(()) => println!("New {}. Use 'set FIELD=VALUE', then 'save'.", schema.name),
            Err(e) => alert(&e),
        },
        ShellCommand::Edit(key) => match list.begin_edit(&key) {
            Ok(id) => println!("Editing {} {}.", schema.name, style(id).cyan()),
            Err(e) => alert(&e),
        },
        ShellCommand::Set { field, value } => {
            if let Err(e) = list.set_field(&field, &value) {
                alert(&e);
            }
        }
        ShellCommand::Draft => print_draft(list),
        ShellCommand::Save => match list.save().await {
            Ok(outcome) => {
                report(schema.name, &outcome);
                draw(list, format)?;
            }
            Err(e) => alert(&e),
        },
        ShellCommand::Cancel => {
            list.cancel();
            println!("{}", style("Cancelled").dim());
        }
        ShellCommand::Delete(key) => match list.delete(&key).await {
            Ok(outcome) => {
                report(schema.name, &outcome);
                draw(list, format)?;
            }
            Err(e) => alert(&e),
        },
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn report(entity: &str, outcome: &Reconciled) {
    match outcome {
        Reconciled::Appended(id) => {
            println!("{} Created {} {}", style("✓").green(), entity, style(id).cyan())
        }
        Reconciled::Merged(id) => {
            println!("{} Updated {} {}", style("✓").green(), entity, style(id).cyan())
        }
        Reconciled::Removed(id) => {
            println!("{} Deleted {} {}", style("✓").green(), entity, style(id).cyan())
        }
        Reconciled::Stale(id) => println!(
            "{} Response for {} {} was superseded",
            style("•").dim(),
            entity,
            id
        ),
        Reconciled::Unchanged => println!("{} No changes", style("•").dim()),
        Reconciled::Reloaded => println!(
            "{} Saved {}; list reloaded from the server",
            style("✓").green(),
            entity
        ),
    }
}

fn draw<A: CatalogApi + ?Sized>(list: &ListController<'_, A>, format: OutputFormat) -> Result<()> {
    let schema = list.schema();
    let page = list.page();

    if page.rows.is_empty() {
        println!("No {} found.", schema.plural);
        return Ok(());
    }

    let columns = schema_columns(schema);
    let visible: Vec<&str> = columns.iter().map(|c| c.key).collect();
    let rows: Vec<TableRow> = page
        .rows
        .iter()
        .map(|r| TableRow::from_record(schema, r))
        .collect();
    let format = match format {
        OutputFormat::Csv | OutputFormat::Md => format,
        _ => OutputFormat::Tsv,
    };

    let mut out = io::stdout().lock();
    TableFormatter::new(&columns, schema.id_field)
        .output(&mut out, &rows, format, &visible)
        .into_diagnostic()?;

    let search = list.view().search();
    let filter_note = if search.is_empty() {
        String::new()
    } else {
        format!(" matching '{}'", search)
    };
    writeln!(
        out,
        "{}{} | page {} of {}{}{}",
        count_label(page.total_matches, schema.name, schema.plural),
        filter_note,
        page.number,
        page.total_pages,
        if page.has_prev() { " | p: prev" } else { "" },
        if page.has_next() { " | n: next" } else { "" },
    )
    .into_diagnostic()?;
    Ok(())
}

fn print_draft<A: CatalogApi + ?Sized>(list: &ListController<'_, A>) {
    match list.session() {
        EditSession::Idle => println!("{}", style("Not editing").dim()),
        EditSession::Editing { target, draft } => {
            println!("{} {}", style("Draft for").bold(), target);
            if draft.is_empty() {
                println!("  {}", style("(no changes)").dim());
            }
            for (field, value) in draft {
                let shown = match value {
                    FieldValue::Null => style("(cleared)".to_string()).dim().to_string(),
                    v => v.to_text(),
                };
                println!("  {}: {}", style(field).cyan(), shown);
            }
        }
    }
}

fn print_help() {
    let commands = [
        ("list", "Redraw the current page"),
        ("next / prev", "Move between pages"),
        ("page <n>", "Jump to a page"),
        ("search [text]", "Filter by name; no text clears the filter"),
        ("new", "Start creating a record"),
        ("edit <id>", "Start editing a record"),
        ("set FIELD=VALUE", "Change a field of the open draft"),
        ("draft", "Show the open draft"),
        ("save", "Send the open draft to the server"),
        ("cancel", "Discard the open draft"),
        ("delete <id>", "Delete a record"),
        ("quit", "Leave the shell"),
    ];
    for (cmd, desc) in commands {
        println!("  {:<18} {}", style(cmd).cyan(), style(desc).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_command("next").unwrap(), Some(ShellCommand::Next));
        assert_eq!(parse_command("  P ").unwrap(), Some(ShellCommand::Prev));
        assert_eq!(parse_command("page 3").unwrap(), Some(ShellCommand::Page(3)));
        assert!(parse_command("page 0").is_err());
        assert!(parse_command("page x").is_err());
        assert!(parse_command("page").is_err());
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            parse_command("search Sir Rodney's").unwrap(),
            Some(ShellCommand::Search("Sir Rodney's".to_string()))
        );
        assert_eq!(
            parse_command("search").unwrap(),
            Some(ShellCommand::Search(String::new()))
        );
    }

    #[test]
    fn test_parse_set_keeps_value_verbatim() {
        assert_eq!(
            parse_command("set Unit=24 - 12 oz bottles").unwrap(),
            Some(ShellCommand::Set {
                field: "Unit".to_string(),
                value: "24 - 12 oz bottles".to_string(),
            })
        );
        assert_eq!(
            parse_command("set Description=").unwrap(),
            Some(ShellCommand::Set {
                field: "Description".to_string(),
                value: String::new(),
            })
        );
        assert!(parse_command("set =oops").is_err());
        assert!(parse_command("set Unit").is_err());
    }

    #[test]
    fn test_parse_edit_and_delete_need_ids() {
        assert_eq!(
            parse_command("edit 7").unwrap(),
            Some(ShellCommand::Edit("7".to_string()))
        );
        assert_eq!(
            parse_command("rm 7").unwrap(),
            Some(ShellCommand::Delete("7".to_string()))
        );
        assert!(parse_command("edit").is_err());
        assert!(parse_command("delete").is_err());
    }

    #[test]
    fn test_parse_unknown() {
        let err = parse_command("frobnicate").unwrap_err();
        assert!(err.contains("unknown command"));
    }
}
