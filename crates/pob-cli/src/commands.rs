use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use pob_store::Document;
use pob_tree::{ModelIndex, ObjectModel, ObjectTree, ProjectionRoot, TreeConfig};
use pob_types::ObjectRef;
use serde::Serialize;

use crate::cli::*;

/// One printed line of the tree.
#[derive(Debug, Serialize)]
pub struct Row {
    pub path: String,
    pub depth: usize,
    pub label: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub value: Option<String>,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format.clone();
    match cli.command {
        Command::Show(args) => cmd_show(args, config, &format),
        Command::Set(args) => cmd_set(args, config, &format),
        Command::InsertKey(args) => cmd_insert_key(args, config, &format),
        Command::InsertElement(args) => cmd_insert_element(args, config, &format),
        Command::Find(args) => cmd_find(args, config, &format),
    }
}

/// Tree settings from `--config`, overridden by flags.
pub fn load_config(cli: &Cli) -> anyhow::Result<TreeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str::<TreeConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => TreeConfig::default(),
    };
    if cli.no_follow {
        config.follow_references = false;
    }
    if cli.from_trailer {
        config.root = ProjectionRoot::Trailer;
    }
    Ok(config)
}

pub fn open_model(path: &Path, config: TreeConfig) -> anyhow::Result<ObjectModel<Document>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading listing {}", path.display()))?;
    let doc = Document::from_listing(&text)
        .with_context(|| format!("loading listing {}", path.display()))?;
    let tree = ObjectTree::new(doc, config).context("invalid document")?;
    Ok(ObjectModel::new(tree))
}

fn resolve(model: &mut ObjectModel<Document>, rows: &RowPath) -> anyhow::Result<ModelIndex> {
    model
        .index_for_path(&rows.0)
        .with_context(|| format!("no row at {rows}"))
}

/// Rows of the subtree at `index`, depth-first, `depth` levels below it.
pub fn collect_rows(
    model: &mut ObjectModel<Document>,
    index: &ModelIndex,
    depth: usize,
) -> Vec<Row> {
    let mut rows = Vec::new();
    collect_into(model, index, 0, depth, &mut rows);
    rows
}

fn collect_into(
    model: &mut ObjectModel<Document>,
    index: &ModelIndex,
    level: usize,
    depth: usize,
    rows: &mut Vec<Row>,
) {
    let path = RowPath(model.path_for_index(index)).to_string();
    rows.push(Row {
        path,
        depth: level,
        label: model.data(index).unwrap_or_default(),
        type_tag: model.data(&index.sibling(1)).unwrap_or_default(),
        value: model.data(&index.sibling(2)),
    });
    if level >= depth {
        return;
    }
    for row in 0..model.row_count(index) {
        let child = model.index(row, 0, index);
        collect_into(model, &child, level + 1, depth, rows);
    }
}

fn print_rows(rows: &[Row], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Text => {
            for row in rows {
                let indent = "  ".repeat(row.depth);
                println!(
                    "{}{}  {}  {}  {}",
                    indent,
                    row.label.bold(),
                    row.type_tag.cyan(),
                    row.value.as_deref().unwrap_or("").dimmed(),
                    format!("[{}]", row.path).yellow()
                );
            }
        }
    }
    Ok(())
}

fn save(model: &ObjectModel<Document>, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        let text = model.tree().store().to_listing()?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        println!("  Written: {}", path.display().to_string().blue());
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, config: TreeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut model = open_model(&args.listing, config)?;
    let index = resolve(&mut model, &args.rows)?;
    let rows = collect_rows(&mut model, &index, args.depth);
    print_rows(&rows, format)
}

fn cmd_set(args: SetArgs, config: TreeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut model = open_model(&args.listing, config)?;
    let index = resolve(&mut model, &args.rows)?;
    let changed = model
        .set_data(&index.sibling(2), &args.value)
        .context("edit rejected")?;
    if changed {
        println!("{} Value at {} changed", "✓".green().bold(), args.rows.to_string().yellow());
    } else {
        println!("Value at {} unchanged", args.rows.to_string().yellow());
    }
    let rows = collect_rows(&mut model, &index, 1);
    print_rows(&rows, format)?;
    save(&model, args.output.as_deref())
}

fn cmd_insert_key(
    args: InsertKeyArgs,
    config: TreeConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut model = open_model(&args.listing, config)?;
    let index = resolve(&mut model, &args.rows)?;
    if !model.insert_key(&args.name, &index)? {
        bail!("cannot insert key /{} at {}", args.name, args.rows);
    }
    println!(
        "{} Inserted /{} at {}",
        "✓".green().bold(),
        args.name,
        args.rows.to_string().yellow()
    );
    let rows = collect_rows(&mut model, &index, 1);
    print_rows(&rows, format)?;
    save(&model, args.output.as_deref())
}

fn cmd_insert_element(
    args: InsertElementArgs,
    config: TreeConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut model = open_model(&args.listing, config)?;
    let index = resolve(&mut model, &args.rows)?;
    if !model.insert_element(args.row, &index)? {
        bail!("cannot insert an element at row {} of {}", args.row, args.rows);
    }
    println!(
        "{} Inserted element {} at {}",
        "✓".green().bold(),
        args.row,
        args.rows.to_string().yellow()
    );
    let rows = collect_rows(&mut model, &index, 1);
    print_rows(&rows, format)?;
    save(&model, args.output.as_deref())
}

fn cmd_find(args: FindArgs, config: TreeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut model = open_model(&args.listing, config)?;
    let reference = ObjectRef::new(args.number, args.generation);
    let Some(index) = model.find_object(reference) else {
        bail!("object {} not reachable", reference.obj_label());
    };
    let rows = collect_rows(&mut model, &index, 0);
    print_rows(&rows, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pob_store::ObjectStore;
    use std::io::Write;

    const LISTING: &str = "\
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [] /Count 0 >> endobj
trailer << /Root 1 0 R >>
";

    fn listing_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LISTING.as_bytes()).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn show_rows_depth_first() {
        let file = listing_file();
        let mut model = open_model(file.path(), TreeConfig::default()).unwrap();
        let root = model.index_for_path(&[0]).unwrap();
        let rows = collect_rows(&mut model, &root, 3);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["/Root", "Type", "Pages", "2 0 obj", "Type", "Kids", "Count"]);
        assert_eq!(rows[3].path, "0.1.0");
        assert_eq!(rows[3].type_tag, "Dictionary");
        assert_eq!(rows[5].value, None);
    }

    #[test]
    fn depth_limits_rows() {
        let file = listing_file();
        let mut model = open_model(file.path(), TreeConfig::default()).unwrap();
        let root = model.index_for_path(&[0]).unwrap();
        assert_eq!(collect_rows(&mut model, &root, 0).len(), 1);
        assert_eq!(collect_rows(&mut model, &root, 1).len(), 3);
    }

    #[test]
    fn rows_serialize_as_json() {
        let file = listing_file();
        let mut model = open_model(file.path(), TreeConfig::default()).unwrap();
        let root = model.index_for_path(&[0]).unwrap();
        let rows = collect_rows(&mut model, &root, 0);
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["type"], "Dictionary");
        assert_eq!(json[0]["label"], "/Root");
    }

    #[test]
    fn config_file_and_flags() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(config_file, "search_depth = 5\nelement_insertion = \"inclusive\"").unwrap();
        let path = config_file.path().to_str().unwrap();

        let config = load_config(&cli(&["pob", "--config", path, "show", "x"])).unwrap();
        assert_eq!(config.search_depth, 5);
        assert!(config.follow_references);

        let flags = ["pob", "--config", path, "--no-follow", "--from-trailer", "show", "x"];
        let config = load_config(&cli(&flags)).unwrap();
        assert!(!config.follow_references);
        assert_eq!(config.root, ProjectionRoot::Trailer);
    }

    #[test]
    fn bad_config_is_an_error() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(config_file, "search_depth = \"deep\"").unwrap();
        let path = config_file.path().to_str().unwrap();
        assert!(load_config(&cli(&["pob", "--config", path, "show", "x"])).is_err());
    }

    #[test]
    fn invalid_document_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"trailer << /Size 1 >>").unwrap();
        let err = open_model(file.path(), TreeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("invalid document"));
    }

    #[test]
    fn set_writes_output() {
        let file = listing_file();
        let out = tempfile::NamedTempFile::new().unwrap();
        let listing = file.path().to_str().unwrap();
        let output = out.path().to_str().unwrap();
        run_command(cli(&["pob", "set", listing, "0.1.0.1", "[3 0 R]", "-o", output])).unwrap();

        let written = fs::read_to_string(out.path()).unwrap();
        let doc = Document::from_listing(&written).unwrap();
        let model = ObjectModel::new(ObjectTree::new(doc, TreeConfig::default()).unwrap());
        let pages = model.tree().store().resolve(ObjectRef::new(2, 0)).unwrap();
        assert_eq!(
            model.tree().store().encode(pages).unwrap(),
            "<< /Type /Pages /Kids [3 0 R] /Count 0 >>"
        );
    }

    #[test]
    fn rejected_edits_fail() {
        let file = listing_file();
        let listing = file.path().to_str().unwrap();
        assert!(run_command(cli(&["pob", "set", listing, "0", "<< /Type"])).is_err());
        assert!(run_command(cli(&["pob", "insert-key", listing, "0", "Type"])).is_err());
        assert!(run_command(cli(&["pob", "insert-element", listing, "0.1.0.1", "0"])).is_err());
        assert!(run_command(cli(&["pob", "show", listing, "--rows", "0.7"])).is_err());
    }

    #[test]
    fn find_reachable_object() {
        let file = listing_file();
        let listing = file.path().to_str().unwrap();
        run_command(cli(&["pob", "find", listing, "2"])).unwrap();
        assert!(run_command(cli(&["pob", "find", listing, "9"])).is_err());
    }
}
