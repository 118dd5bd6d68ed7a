//! Command line
//!
//! Global flags are declared with clap's derive API; the
//! `<service> <resource> <verb>` tree is generated from the resource
//! registry with the builder API, so a new resource definition gets its
//! commands and flags without code changes.

use crate::bulk::BulkScope;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::FilterSet;
use crate::interaction::Interaction;
use crate::output::{render, Outcome, OutputFormat};
use crate::ovh::OvhClient;
use crate::params::{FieldDef, FieldKind, ParameterSources, ParameterSpec};
use crate::resource::{actions, get_registry, get_resource, Context, ResourceDef, Verb};
use crate::version::VERSION;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

/// Command line interface for OVHcloud
#[derive(Parser, Debug, Default)]
#[command(name = "ovhcloud", version = VERSION, about, long_about = None)]
pub struct Cli {
    /// Log level for debugging (written to the log file)
    #[arg(long, value_enum, default_value = "off", global = true)]
    pub log_level: LogLevel,

    /// Skip regions that fail instead of aborting the whole listing
    #[arg(short = 'e', long, global = true)]
    pub ignore_errors: bool,

    /// Output raw JSON
    #[arg(short, long, global = true, conflicts_with_all = ["yaml", "format"])]
    pub json: bool,

    /// Output raw YAML
    #[arg(short, long, global = true, conflicts_with = "format")]
    pub yaml: bool,

    /// Expression applied to each record, printed as JSON (`[id, name]`)
    #[arg(short, long, global = true, value_name = "EXPR")]
    pub format: Option<String>,

    /// Cloud project to use (defaults to OVH_CLOUD_PROJECT or the config file)
    #[arg(long, global = true, value_name = "ID")]
    pub cloud_project: Option<String>,

    /// Only keep records matching the expression (repeatable, all must match)
    #[arg(long = "filter", global = true, value_name = "EXPR")]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogLevel {
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

const FROM_FILE: &str = "from-file";
const EDITOR: &str = "editor";
const INIT_FILE: &str = "init-file";
const REPLACE: &str = "replace";
const PREFIX: &str = "prefix";
const ALL: &str = "all";
const ID: &str = "id";

/// Full command tree: global flags plus one subcommand per service group
pub fn build() -> Command {
    let registry = get_registry();
    Cli::command()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(registry.groups.iter().map(|(name, group)| {
            Command::new(name.clone())
                .about(group.about.clone())
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommands(
                    group
                        .resources
                        .iter()
                        .map(|(name, def)| resource_command(name, def)),
                )
        }))
}

fn resource_command(name: &str, def: &ResourceDef) -> Command {
    let mut command = Command::new(name.to_string())
        .about(def.about.clone())
        .subcommand_required(true)
        .arg_required_else_help(true);

    for verb in &def.verbs {
        command = command.subcommand(verb_command(def, *verb));
    }
    command
}

fn id_arg(def: &ResourceDef, help: String) -> Arg {
    Arg::new(ID)
        .required(true)
        .value_name(def.id_field.to_uppercase())
        .help(help)
}

fn verb_command(def: &ResourceDef, verb: Verb) -> Command {
    let name = &def.display_name;
    match verb {
        Verb::List => Command::new("list")
            .visible_alias("ls")
            .about(format!("List {name} resources")),
        Verb::Get => Command::new("get")
            .about(format!("Get a specific {name}"))
            .arg(id_arg(def, format!("Identifier of the {name}"))),
        Verb::Create => {
            let fields = def.create.as_ref().map(|c| c.fields.as_slice()).unwrap_or_default();
            parameter_args(Command::new("create").about(format!("Create a new {name}")), fields)
        }
        Verb::Edit => {
            let fields = def.edit.as_ref().map(|e| e.fields.as_slice()).unwrap_or_default();
            parameter_args(Command::new("edit").about(format!("Edit the given {name}")), fields)
                .arg(id_arg(def, format!("Identifier of the {name} to edit")))
        }
        Verb::Delete => Command::new("delete")
            .about(format!("Delete the given {name}"))
            .arg(id_arg(def, format!("Identifier of the {name} to delete"))),
        Verb::BulkDelete => Command::new("bulk-delete")
            .about("Delete many objects of a container at once")
            .arg(id_arg(def, format!("{name} holding the objects")))
            .arg(
                Arg::new(PREFIX)
                    .long(PREFIX)
                    .value_name("PREFIX")
                    .help("Delete objects whose key starts with this prefix"),
            )
            .arg(
                Arg::new(ALL)
                    .long(ALL)
                    .action(ArgAction::SetTrue)
                    .conflicts_with(PREFIX)
                    .help("Delete every object of the container"),
            ),
    }
}

/// Field flags plus the generic parameter flags
fn parameter_args(command: Command, fields: &[FieldDef]) -> Command {
    let command = command.args(fields.iter().map(field_arg));
    command
        .arg(
            Arg::new(FROM_FILE)
                .long(FROM_FILE)
                .value_name("PATH")
                .help("File containing parameters (JSON or YAML), '-' for stdin"),
        )
        .arg(
            Arg::new(EDITOR)
                .long(EDITOR)
                .action(ArgAction::SetTrue)
                .conflicts_with(FROM_FILE)
                .help("Use a text editor to define parameters"),
        )
        .arg(
            Arg::new(INIT_FILE)
                .long(INIT_FILE)
                .value_name("PATH")
                .help("Create a file with example parameters and exit"),
        )
        .arg(
            Arg::new(REPLACE)
                .long(REPLACE)
                .action(ArgAction::SetTrue)
                .requires(INIT_FILE)
                .help("Replace the parameters file if it already exists"),
        )
}

fn field_arg(field: &FieldDef) -> Arg {
    let arg = Arg::new(field.flag.clone())
        .long(field.flag.clone())
        .help(field.help.clone());

    match field.kind {
        FieldKind::String => arg.action(ArgAction::Set).value_name("STRING"),
        FieldKind::Integer => arg.action(ArgAction::Set).value_name("INT"),
        FieldKind::Boolean => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(["true", "false"]),
        FieldKind::StringSet => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_name("STRING"),
        FieldKind::StringMap => arg.action(ArgAction::Append).value_name("KEY=VALUE"),
    }
}

/// Values explicitly given on the command line
fn bind_fields(fields: &[FieldDef], matches: &ArgMatches) -> Result<ParameterSpec> {
    let mut spec = ParameterSpec::new(fields.to_vec());
    for field in fields {
        if matches.value_source(&field.flag) != Some(ValueSource::CommandLine) {
            continue;
        }
        let raw: Vec<String> = matches
            .get_many::<String>(&field.flag)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        spec.set_from_args(&field.flag, &raw)?;
    }
    Ok(spec)
}

fn parameter_sources(matches: &ArgMatches, stdin_piped: bool) -> ParameterSources {
    ParameterSources {
        from_file: matches.get_one::<String>(FROM_FILE).cloned(),
        editor: matches.get_flag(EDITOR),
        stdin_piped,
        stdin: None,
    }
}

fn verb_from_name(name: &str) -> Option<Verb> {
    [
        Verb::List,
        Verb::Get,
        Verb::Create,
        Verb::Edit,
        Verb::Delete,
        Verb::BulkDelete,
    ]
    .into_iter()
    .find(|verb| verb.name() == name)
}

/// Resource, verb and verb-level matches of the invoked command
fn selected(matches: &ArgMatches) -> Result<(&'static ResourceDef, Verb, &ArgMatches)> {
    let missing = || Error::config("no command given, see --help");
    let (group, group_matches) = matches.subcommand().ok_or_else(missing)?;
    let (resource, resource_matches) = group_matches.subcommand().ok_or_else(missing)?;
    let (verb, verb_matches) = resource_matches.subcommand().ok_or_else(missing)?;

    let def = get_resource(group, resource)
        .ok_or_else(|| Error::config(format!("unknown resource {group} {resource}")))?;
    let verb = verb_from_name(verb).ok_or_else(|| Error::config(format!("unknown verb {verb}")))?;
    Ok((def, verb, verb_matches))
}

/// Per-process inputs of a command run
pub struct Session<'a> {
    pub config: &'a Config,
    pub interaction: &'a dyn Interaction,
    /// Whether stdin is a pipe or a regular file, which makes it a parameter source
    pub stdin_piped: bool,
}

/// Run the parsed command and render its result
pub async fn run(matches: &ArgMatches, session: &Session<'_>) -> Result<String> {
    let cli = Cli::from_arg_matches(matches).map_err(|e| Error::config(e.to_string()))?;

    // Expressions are compiled before anything is fetched
    let filters = FilterSet::compile(&cli.filters)?;
    let format = OutputFormat::from_flags(cli.json, cli.yaml, cli.format.as_deref())?;

    let (def, verb, args) = selected(matches)?;
    tracing::debug!("Running {} {}", def.display_name, verb.name());

    let client = OvhClient::new(session.config)?;
    let ctx = Context {
        client: &client,
        project: session
            .config
            .effective_cloud_project(cli.cloud_project.as_deref()),
        ignore_errors: cli.ignore_errors,
        interaction: session.interaction,
    };

    let outcome = dispatch(&ctx, def, verb, args, &filters, session.stdin_piped).await?;
    render(&outcome, &format)
}

async fn dispatch(
    ctx: &Context<'_>,
    def: &ResourceDef,
    verb: Verb,
    args: &ArgMatches,
    filters: &FilterSet,
    stdin_piped: bool,
) -> Result<Outcome> {
    let id = || {
        args.get_one::<String>(ID)
            .cloned()
            .ok_or_else(|| Error::config(format!("missing {} identifier", def.display_name)))
    };

    match verb {
        Verb::List => {
            let records = filters.apply(actions::list(ctx, def).await?);
            Ok(Outcome::Records {
                records,
                columns: def.columns.clone(),
            })
        }
        Verb::Get => Ok(Outcome::Record(actions::get(ctx, def, &id()?).await?)),
        Verb::Create | Verb::Edit => {
            let fields = match verb {
                Verb::Create => def.create.as_ref().map(|c| c.fields.as_slice()),
                _ => def.edit.as_ref().map(|e| e.fields.as_slice()),
            };
            let spec = bind_fields(fields.unwrap_or_default(), args)?;

            if let Some(path) = args.get_one::<String>(INIT_FILE) {
                let replace = args.get_flag(REPLACE);
                return actions::init_file(ctx, def, verb, &spec, &PathBuf::from(path), replace);
            }

            let sources = parameter_sources(args, stdin_piped);
            if verb == Verb::Create {
                actions::create(ctx, def, &spec, &sources).await
            } else {
                actions::edit(ctx, def, &id()?, &spec, &sources).await
            }
        }
        Verb::Delete => actions::delete(ctx, def, &id()?).await,
        Verb::BulkDelete => {
            let scope = BulkScope::from_flags(
                args.get_one::<String>(PREFIX).cloned(),
                args.get_flag(ALL),
            )?;
            actions::bulk_delete(ctx, def, &id()?, &scope).await
        }
    }
}
