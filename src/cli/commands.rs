use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, OutlineArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{NodeDocument, OutlineDocument, RenderMode};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };

    match &cli.command {
        Some(Commands::Config { command }) => return _config(command, &config_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(Some(&config_dir))?;
    debug!(?settings, "loaded settings");
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Generate { outline, render }) => {
            _generate(&container, outline, render_mode(*render))
        }
        Some(Commands::Check { file, render }) => _check(&container, file, render_mode(*render)),
        Some(Commands::Tree { file }) => _tree(&container, file),
        Some(Commands::Show {
            outline,
            student_mastery,
            class_mastery,
            json,
        }) => _show(&container, outline, student_mastery, class_mastery, *json),
        Some(Commands::Update {
            payload,
            outline,
            json,
        }) => _update(&container, outline, payload, *json),
        Some(Commands::Config { .. }) | Some(Commands::Completion { .. }) | None => Ok(()),
    }
}

fn render_mode(render: bool) -> RenderMode {
    if render {
        RenderMode::Render
    } else {
        RenderMode::Compact
    }
}

/// Resolve school/course, falling back to configured defaults.
fn resolve<'a>(container: &'a ServiceContainer, args: &'a OutlineArgs) -> (&'a str, &'a str) {
    let school = args
        .school
        .as_deref()
        .unwrap_or(&container.settings.default_school);
    let course = args
        .course
        .as_deref()
        .unwrap_or(&container.settings.default_course);
    (school, course)
}

fn not_found(school: &str, course: &str) -> CliError {
    CliError::NotFound(format!("{school}/{course}"))
}

#[instrument(skip(container))]
fn _generate(container: &ServiceContainer, args: &OutlineArgs, mode: RenderMode) -> CliResult<()> {
    let (school, course) = resolve(container, args);
    let generated = container
        .outlines
        .generate(school, course, mode)?
        .ok_or_else(|| not_found(school, course))?;

    output::action("Generated", &generated.path.display());
    output::detail(&format!(
        "{} ({}, {} concepts)",
        generated.document.name, generated.document.term, generated.document.count
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, file: &Path, mode: RenderMode) -> CliResult<()> {
    let document = container.outlines.check(file, mode)?;
    output::success(&format!(
        "{}: {} concepts, starts {}",
        file.display(),
        document.count,
        document.start_date
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let outline = container.outlines.inspect(file)?;

    output::header(&format!("{} ({})", outline.name, outline.term));
    output::detail(&format!(
        "orientation: {}, start date: {}",
        outline.orientation,
        outline.formatted_start_date()
    ));
    output::detail(&format!("styles: {}", outline.styles.keys().join(", ")));
    output::detail(&format!(
        "class levels: {}",
        outline.class_levels.iter().map(|l| &l.name).join(", ")
    ));
    output::detail(&format!(
        "student levels: {}",
        outline.student_levels.iter().map(|l| &l.name).join(", ")
    ));
    output::detail(&format!(
        "{} concepts, {} leaves, depth {}",
        outline.count(),
        outline.tree.leaf_labels().len(),
        outline.tree.depth()
    ));
    output::info(&outline.tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn _show(
    container: &ServiceContainer,
    args: &OutlineArgs,
    student_mastery: &str,
    class_mastery: &str,
    json: bool,
) -> CliResult<()> {
    let (school, course) = resolve(container, args);
    let document = container
        .outlines
        .render(school, course, student_mastery, class_mastery)?
        .ok_or_else(|| not_found(school, course))?;
    print_document(&document, json)
}

#[instrument(skip(container))]
fn _update(
    container: &ServiceContainer,
    args: &OutlineArgs,
    payload_path: &Path,
    json: bool,
) -> CliResult<()> {
    let payload = container
        .fs
        .read_to_string(payload_path)
        .map_err(|e| InfraError::io(format!("read {}", payload_path.display()), e))?;
    let (school, course) = resolve(container, args);
    let document = container
        .outlines
        .update_mastery(school, course, &payload)?
        .ok_or_else(|| not_found(school, course))?;
    print_document(&document, json)
}

fn print_document(document: &OutlineDocument, json: bool) -> CliResult<()> {
    if json {
        let rendered = document
            .to_json_pretty()
            .map_err(crate::application::ApplicationError::from)?;
        output::info(&rendered);
        return Ok(());
    }

    output::header(&format!("{} ({})", document.name, document.term));
    output::info(&mastery_tree(&document.nodes, document));
    Ok(())
}

fn level_name(levels: &[crate::domain::Level], index: Option<u32>) -> &str {
    index
        .and_then(|i| levels.get(i as usize))
        .map(|l| l.name.as_str())
        .unwrap_or("-")
}

fn mastery_tree(node: &NodeDocument, document: &OutlineDocument) -> Tree<String> {
    let student = level_name(&document.student_levels, node.student_level);
    let class = match &node.class_level {
        Some(level) => format!("{:.2}", level.as_f64()),
        None => "-".to_string(),
    };
    let label = format!(
        "{} [Week{}] student: {}, class: {}",
        node.name, node.data.week, student, class
    );
    node.children()
        .iter()
        .fold(Tree::new(label), |mut tree, child| {
            tree.push(mastery_tree(child, document));
            tree
        })
}

fn _config(command: &ConfigCommands, config_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(config_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"(no home directory)"),
            }
            output::action("local", &local_config_path(config_dir).display());
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(config_dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::InvalidArgs(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .and_then(|_| fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
