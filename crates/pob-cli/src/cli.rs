use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pob",
    about = "PDF object browser: view and edit an object listing as a tree",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with tree settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show references as leaves
    #[arg(long, global = true)]
    pub no_follow: bool,

    /// Root the tree at the trailer instead of the catalog
    #[arg(long, global = true)]
    pub from_trailer: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the object tree
    Show(ShowArgs),
    /// Replace the value at a row
    Set(SetArgs),
    /// Add a key to the dictionary at a row
    InsertKey(InsertKeyArgs),
    /// Add a null element to the array at a row
    InsertElement(InsertElementArgs),
    /// Print the row path of an indirect object
    Find(FindArgs),
}

/// Row indices from the top level, written `0.2.1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowPath(pub Vec<usize>);

impl FromStr for RowPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('.')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid row {part:?} in path {s:?}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RowPath)
    }
}

impl fmt::Display for RowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

#[derive(Args)]
pub struct ShowArgs {
    pub listing: PathBuf,
    /// Start at this row instead of the root
    #[arg(long, default_value = "0")]
    pub rows: RowPath,
    #[arg(short = 'd', long, default_value = "3")]
    pub depth: usize,
}

#[derive(Args)]
pub struct SetArgs {
    pub listing: PathBuf,
    pub rows: RowPath,
    pub value: String,
    /// Write the edited listing here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InsertKeyArgs {
    pub listing: PathBuf,
    pub rows: RowPath,
    pub name: String,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InsertElementArgs {
    pub listing: PathBuf,
    pub rows: RowPath,
    pub row: usize,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct FindArgs {
    pub listing: PathBuf,
    pub number: u32,
    #[arg(default_value = "0")]
    pub generation: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_show_defaults() {
        let cli = Cli::try_parse_from(["pob", "show", "doc.txt"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert_eq!(args.listing, PathBuf::from("doc.txt"));
            assert_eq!(args.rows, RowPath(vec![0]));
            assert_eq!(args.depth, 3);
        } else { panic!("wrong command"); }
        assert!(!cli.no_follow);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_set() {
        let args = ["pob", "set", "doc.txt", "0.1.0", "<< /A 1 >>", "-o", "out.txt"];
        let cli = Cli::try_parse_from(args).unwrap();
        if let Command::Set(args) = cli.command {
            assert_eq!(args.rows, RowPath(vec![0, 1, 0]));
            assert_eq!(args.value, "<< /A 1 >>");
            assert_eq!(args.output, Some(PathBuf::from("out.txt")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_insert_commands() {
        let cli = Cli::try_parse_from(["pob", "insert-key", "doc.txt", "0", "Outlines"]).unwrap();
        assert!(matches!(cli.command, Command::InsertKey(ref a) if a.name == "Outlines"));
        let cli = Cli::try_parse_from(["pob", "insert-element", "doc.txt", "0.2", "1"]).unwrap();
        assert!(matches!(cli.command, Command::InsertElement(ref a) if a.row == 1));
    }

    #[test]
    fn parse_find_and_globals() {
        let cli = Cli::try_parse_from([
            "pob",
            "find",
            "doc.txt",
            "12",
            "--no-follow",
            "--from-trailer",
            "--format",
            "json",
        ])
        .unwrap();
        if let Command::Find(args) = cli.command {
            assert_eq!(args.number, 12);
            assert_eq!(args.generation, 0);
        } else { panic!("wrong command"); }
        assert!(cli.no_follow);
        assert!(cli.from_trailer);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn row_path_parsing() {
        assert_eq!("0.2.1".parse::<RowPath>().unwrap(), RowPath(vec![0, 2, 1]));
        assert_eq!("0".parse::<RowPath>().unwrap().to_string(), "0");
        assert!("0..1".parse::<RowPath>().is_err());
        assert!("a".parse::<RowPath>().is_err());
        assert!(Cli::try_parse_from(["pob", "set", "doc.txt", "x.1", "1"]).is_err());
    }
}
