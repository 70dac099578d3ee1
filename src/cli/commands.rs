use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{AttrValue, Attributes, Choice, FieldKind};
use crate::infrastructure::di::ServiceContainer;
use crate::tree_traits::{TreeNodeConvert, TreeStyle};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `variantree --help`".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        return _completion(*shell);
    }

    let page_dir = command.page().and_then(|p| p.parent()).map(Path::to_path_buf);
    let settings = Settings::load(page_dir.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { page } => _tree(&container, page.as_deref()),
        Commands::Masters { page } => _masters(&container, page.as_deref()),
        Commands::Attrs { name, page, local } => _attrs(&container, name, page.as_deref(), *local),
        Commands::Render { name, page } => _render(&container, name, page.as_deref()),
        Commands::Fields => _fields(&container),
        Commands::Check { page } => _check(&container, page.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::Show { .. } => _config_show(&container),
            ConfigCommands::Path => _config_path(page_dir.as_deref()),
        },
        Commands::Completion { shell } => _completion(*shell),
    }
}

fn load_page(
    container: &ServiceContainer,
    page: Option<&Path>,
) -> CliResult<(PathBuf, crate::domain::Page)> {
    let path = container.page_service.page_path(page)?;
    let loaded = container.page_service.load(&path)?;
    Ok((path, loaded))
}

fn tree_style(container: &ServiceContainer) -> TreeStyle {
    TreeStyle {
        show_ids: container.settings.show_ids,
    }
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, page: Option<&Path>) -> CliResult<()> {
    let (path, page) = load_page(container, page)?;
    debug!("page: {}", path.display());

    if let Some(title) = &page.title {
        output::header(title);
    }
    let trees = page.to_tree_string(tree_style(container));
    if trees.is_empty() {
        output::warning(&format!("{} declares no components", path.display()));
    }
    for tree in trees {
        print!("{}", tree);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _masters(container: &ServiceContainer, page: Option<&Path>) -> CliResult<()> {
    let (_, page) = load_page(container, page)?;
    for tree in page.arena.to_tree_string(tree_style(container)) {
        print!("{}", tree);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _attrs(
    container: &ServiceContainer,
    name: &str,
    page: Option<&Path>,
    local_only: bool,
) -> CliResult<()> {
    let (_, page) = load_page(container, page)?;
    let resolved = container
        .page_service
        .resolved_attributes(&page, name, local_only)?;

    output::header(name);
    if resolved.is_empty() {
        output::detail("(no attributes)");
    }
    for attr in &resolved {
        if attr.inherited {
            output::inherited(&attr.key, &attr.value, &attr.origin_label);
        } else {
            output::local(&attr.key, &attr.value);
        }
    }
    Ok(())
}

fn format_attrs(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(key, value)| match value {
            AttrValue::Text(text) => format!("{}: {:?}", key, text),
            other => format!("{}: {}", key, other),
        })
        .join(", ")
}

#[instrument(skip(container))]
fn _render(container: &ServiceContainer, name: &str, page: Option<&Path>) -> CliResult<()> {
    let (_, page) = load_page(container, page)?;
    let id = page.resolve(name)?;
    let node = page.arena.node(id)?;
    let props = container.page_service.render_props(&page, name)?;

    output::header(&format!("{} <{}>", name, node.component_type));
    output::action("props", &format!("{{ {} }}", format_attrs(&props.html)));
    output::action("sx", &format!("{{ {} }}", format_attrs(&props.style)));
    Ok(())
}

fn describe_field(field: &FieldKind) -> String {
    match field {
        FieldKind::Dropdown { choices } => {
            let labeled = choices
                .iter()
                .map(|c| match c {
                    Choice::Plain(v) => v.clone(),
                    Choice::Labeled { value, text } => format!("{}={}", value, text),
                })
                .join(" | ");
            format!("dropdown ({})", labeled)
        }
        other => other.to_string(),
    }
}

#[instrument(skip(container))]
fn _fields(container: &ServiceContainer) -> CliResult<()> {
    let fieldset = container.page_service.fieldset();
    let width = fieldset.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, field) in fieldset.iter() {
        output::info(&format!("{:width$}  {}", key, describe_field(field), width = width));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, page: Option<&Path>) -> CliResult<()> {
    let (path, page) = load_page(container, page)?;
    let summary = container.page_service.summarize(&page)?;

    output::success(&format!("{} is consistent", path.display()));
    output::detail(&format!("components: {}", summary.components));
    output::detail(&format!("nodes:      {}", summary.nodes));
    output::detail(&format!("roots:      {}", summary.roots));
    output::detail(&format!("max depth:  {}", summary.max_depth));
    Ok(())
}

fn _config_show(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.settings.to_toml()?);
    Ok(())
}

fn _config_path(page_dir: Option<&Path>) -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            let marker = if path.exists() { "" } else { " (missing)" };
            output::action("global", &format!("{}{}", path.display(), marker));
        }
        None => output::warning("no home directory, global config disabled"),
    }
    let local = local_config_path(page_dir.unwrap_or_else(|| Path::new(".")));
    let marker = if local.exists() { "" } else { " (missing)" };
    output::action("local", &format!("{}{}", local.display(), marker));
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
