//! `catadm <entity>` commands - list, show, create, edit and delete records
//!
//! The same subcommands serve categories, products, suppliers and customers.
//! Each invocation loads the collection once and then works through the
//! generic list controller, exactly like the interactive shell does.

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{connect, count_label, load_config};
use crate::cli::table::{schema_columns, CellValue, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::view::{self, ViewState};
use crate::core::{
    CatalogApi, CollectionStore, FieldValue, ListController, Record, RecordId, Reconciled,
};
use crate::entities::Entity;
use crate::schema::{validator, EntitySchema, FieldDef};

#[derive(Subcommand, Debug)]
pub enum EntityCommands {
    /// List records, one page at a time
    List(ListArgs),

    /// Show one record's details
    Show(ShowArgs),

    /// Create a new record
    New(NewArgs),

    /// Change fields of an existing record
    Edit(EditArgs),

    /// Delete a record
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive match on the name field
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show (10 rows per page)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Show every matching row instead of a single page
    #[arg(long, short = 'a', conflicts_with = "page")]
    pub all: bool,

    /// Show only the number of matching rows
    #[arg(long)]
    pub count: bool,

    /// Columns to display, by field name (default: all fields)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Record identity
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Field assignment, repeatable (e.g. --set ProductName=Chai)
    #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Interactive mode (prompt for every field)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Record identity
    pub id: String,

    /// Field assignment, repeatable (an empty VALUE clears the field)
    #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Interactive mode (prompt for every field, current values as defaults)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Record identity
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an entity subcommand
pub async fn run(entity: Entity, cmd: EntityCommands, global: &GlobalOpts) -> Result<()> {
    let schema = entity.schema();
    match cmd {
        EntityCommands::List(args) => run_list(schema, args, global).await,
        EntityCommands::Show(args) => run_show(schema, args, global).await,
        EntityCommands::New(args) => run_new(schema, args, global).await,
        EntityCommands::Edit(args) => run_edit(schema, args, global).await,
        EntityCommands::Delete(args) => run_delete(schema, args, global).await,
    }
}

async fn run_list(schema: &'static EntitySchema, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let api = connect(&config)?;
    let store = CollectionStore::load(&api, schema).await.into_diagnostic()?;

    let state = ViewState::at(args.search.clone().unwrap_or_default(), args.page);
    let page = state.derive(schema, store.records());

    if args.count {
        println!("{}", page.total_matches);
        return Ok(());
    }

    let visible = visible_columns(schema, &args.columns)?;
    let rows: Vec<&Record> = if args.all {
        view::filter(schema, store.records(), state.search())
    } else {
        page.rows.clone()
    };

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if rows.is_empty() && format == OutputFormat::Tsv {
                if page.total_matches > 0 {
                    println!(
                        "Page {} is past the end ({} page(s) of {}).",
                        page.number,
                        page.total_pages,
                        schema.plural
                    );
                } else {
                    println!("No {} found.", schema.plural);
                }
                return Ok(());
            }

            let columns = schema_columns(schema);
            let table_rows: Vec<TableRow> = rows
                .iter()
                .map(|r| TableRow::from_record(schema, r))
                .collect();
            let mut out = io::stdout().lock();
            TableFormatter::new(&columns, schema.id_field)
                .output(&mut out, &table_rows, format, &visible)
                .into_diagnostic()?;

            if format == OutputFormat::Tsv && !global.quiet {
                writeln!(out).into_diagnostic()?;
                let found = count_label(page.total_matches, schema.name, schema.plural);
                if args.all {
                    writeln!(out, "{} found.", style(found).cyan()).into_diagnostic()?;
                } else {
                    writeln!(
                        out,
                        "{} found. Page {} of {}.",
                        style(found).cyan(),
                        page.number,
                        page.total_pages
                    )
                    .into_diagnostic()?;
                }
            }
        }
    }

    Ok(())
}

/// Resolve `--columns` against the schema; no selection means every field
fn visible_columns(schema: &EntitySchema, requested: &[String]) -> Result<Vec<&'static str>> {
    if requested.is_empty() {
        return Ok(schema.fields.iter().map(|f| f.name).collect());
    }
    requested
        .iter()
        .map(|name| {
            validator::resolve(schema, name)
                .map(|def| def.name)
                .into_diagnostic()
        })
        .collect()
}

async fn run_show(schema: &'static EntitySchema, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let api = connect(&config)?;
    let store = CollectionStore::load(&api, schema).await.into_diagnostic()?;

    let id = store.find(&args.id).into_diagnostic()?;
    let record = store
        .get(&id)
        .ok_or_else(|| miette::miette!("No {} found matching '{}'", schema.name, args.id))?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Auto);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(record).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(record).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            println!("{}", id);
        }
        _ => print_detail(schema, &id, record),
    }

    Ok(())
}

fn print_detail(schema: &EntitySchema, id: &RecordId, record: &Record) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style(schema.id_field).bold(), style(id).cyan());
    println!(
        "{}: {}",
        style("Name").bold(),
        style(schema.display_value(record)).yellow()
    );
    println!("{}", style("─".repeat(60)).dim());

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for def in schema.fields {
        let value = match CellValue::for_field(def, record.get(def.name)) {
            CellValue::Empty => "-".to_string(),
            cell => cell.raw(),
        };
        builder.push_record([def.label.to_string(), value]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}

async fn run_new(schema: &'static EntitySchema, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let api = connect(&config)?;
    let mut list = ListController::load(&api, schema).await.into_diagnostic()?;

    list.begin_create().into_diagnostic()?;
    apply_assignments(&mut list, &args.set)?;
    if args.interactive {
        prompt_fields(&mut list, None)?;
    }

    let outcome = list.save().await.into_diagnostic()?;
    let id = match outcome {
        Reconciled::Appended(id) => id,
        Reconciled::Reloaded => {
            // The server replied without a usable identity to report
            if global.format != OutputFormat::Id {
                println!("{} Created {}", style("✓").green(), schema.name);
            }
            return Ok(());
        }
        other => return Err(miette::miette!("Unexpected outcome for create: {:?}", other)),
    };

    if global.format == OutputFormat::Id {
        println!("{}", id);
        return Ok(());
    }

    let name = list
        .store()
        .get(&id)
        .map(|r| schema.display_value(r))
        .unwrap_or_default();
    println!(
        "{} Created {} {}",
        style("✓").green(),
        schema.name,
        style(&id).cyan()
    );
    if !global.quiet {
        println!("   Name: {}", style(name).yellow());
    }

    Ok(())
}

async fn run_edit(schema: &'static EntitySchema, args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let api = connect(&config)?;
    let mut list = ListController::load(&api, schema).await.into_diagnostic()?;

    let id = list.begin_edit(&args.id).into_diagnostic()?;
    apply_assignments(&mut list, &args.set)?;
    if args.interactive {
        let current = list.store().get(&id).cloned();
        prompt_fields(&mut list, current.as_ref())?;
    }

    match list.save().await.into_diagnostic()? {
        Reconciled::Unchanged => {
            println!(
                "{} No changes to {} {}",
                style("•").dim(),
                schema.name,
                style(&id).cyan()
            );
        }
        _ => {
            println!(
                "{} Updated {} {}",
                style("✓").green(),
                schema.name,
                style(&id).cyan()
            );
        }
    }

    Ok(())
}

async fn run_delete(
    schema: &'static EntitySchema,
    args: DeleteArgs,
    global: &GlobalOpts,
) -> Result<()> {
    let config = load_config(global);
    let api = connect(&config)?;
    let mut list = ListController::load(&api, schema).await.into_diagnostic()?;

    let id = list.store().find(&args.id).into_diagnostic()?;
    let name = list
        .store()
        .get(&id)
        .map(|r| schema.display_value(r))
        .unwrap_or_default();

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {} {} ({})?", schema.name, id, name))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{}", style("Aborted").dim());
            return Ok(());
        }
    }

    list.delete(&args.id).await.into_diagnostic()?;
    println!(
        "{} Deleted {} {}",
        style("✓").green(),
        schema.name,
        style(&id).cyan()
    );

    Ok(())
}

/// Feed `FIELD=VALUE` pairs into the open edit session
fn apply_assignments<A>(list: &mut ListController<'_, A>, assignments: &[String]) -> Result<()>
where
    A: CatalogApi + ?Sized,
{
    for assignment in assignments {
        let (field, value) = validator::parse_assignment(assignment).into_diagnostic()?;
        list.set_field(&field, &value).into_diagnostic()?;
    }
    Ok(())
}

/// Typed at a prompt to clear an optional field
const CLEAR_MARK: &str = "-";

/// Prompt for every field. Each prompt defaults to the drafted value, falling
/// back to the stored one; only answers that differ from that default go into
/// the draft.
fn prompt_fields<A>(list: &mut ListController<'_, A>, current: Option<&Record>) -> Result<()>
where
    A: CatalogApi + ?Sized,
{
    let schema = list.schema();
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{} {} {}",
        style("◆").cyan(),
        if current.is_some() { "Editing" } else { "Creating new" },
        style(schema.name).bold()
    );
    println!("{}", style("─".repeat(50)).dim());

    for def in schema.fields {
        let existing = current
            .and_then(|r| r.get(def.name))
            .map(FieldValue::to_text)
            .unwrap_or_default();
        let drafted = list
            .session()
            .draft()
            .and_then(|d| d.get(def.name))
            .map(FieldValue::to_text);
        let default = drafted.unwrap_or(existing);

        let prompt = if def.required {
            format!("{} ({})", def.label, style("required").red())
        } else if default.is_empty() {
            format!("{} ({})", def.label, def.field_type)
        } else {
            format!("{} ({}, '{}' clears)", def.label, def.field_type, CLEAR_MARK)
        };

        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(!def.required);
        if !default.is_empty() {
            input = input.default(default.clone());
        }
        let answer = input.interact_text().into_diagnostic()?;

        if let Some(value) = changed_input(def, &default, &answer) {
            list.set_field(def.name, value).into_diagnostic()?;
        }
    }

    Ok(())
}

/// The input to draft for a prompt answer, or `None` when it keeps the default
fn changed_input<'a>(def: &FieldDef, default: &str, answer: &'a str) -> Option<&'a str> {
    let value = if !def.required && answer.trim() == CLEAR_MARK {
        ""
    } else {
        answer
    };
    (value != default).then_some(value)
}
