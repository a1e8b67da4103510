use crate::loader::WorkspaceFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Pick by file extension, then by content.
    #[default]
    Auto,
    Json,
    Xml,
}

impl From<InputFormat> for WorkspaceFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Auto => WorkspaceFormat::Auto,
            InputFormat::Json => WorkspaceFormat::Json,
            InputFormat::Xml => WorkspaceFormat::Xml,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "rover-blockgen",
    about = "Generate MicroPython for the rover board from a block editor workspace."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    #[arg(value_name = "OUTPUT", help = "Write the program here instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto, help = "Workspace export format.")]
    pub format: InputFormat,

    #[arg(
        long,
        help = "Fill empty value sockets with the slot default (or the marker) instead of failing."
    )]
    pub allow_missing_inputs: bool,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Code used for empty sockets without a default. Requires --allow-missing-inputs."
    )]
    pub missing_marker: Option<String>,

    #[arg(long, default_value_t = 2, help = "Spaces per indentation level.")]
    pub indent: usize,

    #[arg(
        long,
        value_name = "PATH",
        help = "Write the block catalog (editor JSON definitions) to this path."
    )]
    pub emit_catalog: Option<PathBuf>,
}
