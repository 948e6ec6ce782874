use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use psikit_markup::{EncodeMode, EncodeOptions, MarkupNode};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Text to encode (reads stdin when neither TEXT nor --file is given)
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Encoding mode (entities, cdata)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Escape every non-ASCII character
    #[arg(long)]
    pub non_ascii: bool,

    /// Print the node list as JSON instead of markup
    #[arg(long)]
    pub json: bool,

    /// Print a per-node breakdown to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn encode(args: EncodeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let options = options_for(&args, config.encode)?;
    let text = read_input(&args)?;

    let fragment = options.encode(&text);

    if args.verbose {
        for node in fragment.children() {
            let label = match node {
                MarkupNode::Text { .. } => "text".green(),
                MarkupNode::CharRef { .. } => "ref ".yellow(),
                MarkupNode::CData { .. } => "cdata".blue(),
            };
            eprintln!("  {} {}", label, node.to_string().dimmed());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(fragment.children())?);
    } else {
        print!("{}", fragment);
        if !text.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

/// Command-line flags override the config file
fn options_for(args: &EncodeArgs, mut options: EncodeOptions) -> Result<EncodeOptions> {
    if let Some(mode) = &args.mode {
        options.mode = match mode.as_str() {
            "entities" => EncodeMode::Entities,
            "cdata" => EncodeMode::Cdata,
            _ => {
                return Err(anyhow!(
                    "Invalid mode: {}. Use: entities or cdata",
                    mode
                ));
            }
        };
    }
    if args.non_ascii {
        options.escape_non_ascii = true;
    }
    Ok(options)
}

fn read_input(args: &EncodeArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()));
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Cannot read stdin")?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(mode: Option<&str>, non_ascii: bool) -> EncodeArgs {
        EncodeArgs {
            text: Some("a<b".to_string()),
            file: None,
            mode: mode.map(str::to_string),
            non_ascii,
            json: false,
            verbose: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let options = options_for(&args(Some("cdata"), true), EncodeOptions::default()).unwrap();
        assert_eq!(options.mode, EncodeMode::Cdata);
        assert!(options.escape_non_ascii);
    }

    #[test]
    fn test_config_kept_without_flags() {
        let configured = EncodeOptions::attribute_value();
        let options = options_for(&args(None, false), configured.clone()).unwrap();
        assert_eq!(options, configured);
    }

    #[test]
    fn test_invalid_mode() {
        assert!(options_for(&args(Some("base64"), false), EncodeOptions::default()).is_err());
    }

    #[test]
    fn test_text_argument_is_input() {
        assert_eq!(read_input(&args(None, false)).unwrap(), "a<b");
    }
}
