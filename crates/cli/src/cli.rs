use clap::Parser;
use std::path::PathBuf;

use mediacanon_core::Mode;

#[derive(Parser, Debug)]
#[command(name = "mediacanon")]
#[command(
    author,
    version,
    about = "Convert a website's images to PNG, audio to Ogg Vorbis and video to Ogg Theora"
)]
pub struct Cli {
    /// Directory to scan (defaults to the parent of the tool's own directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Convert files and rewrite references (default)
    #[arg(long, conflicts_with = "check")]
    pub apply: bool,

    /// Report pending work without touching anything
    #[arg(long)]
    pub check: bool,

    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else {
            Mode::Apply
        }
    }

    /// Explicit `--root`, else the directory above the one holding the binary.
    pub fn resolve_root(&self) -> anyhow::Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let exe = std::env::current_exe()?;
        exe.parent()
            .and_then(|dir| dir.parent())
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("Cannot derive a default root from {:?}", exe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_apply() {
        let cli = Cli::parse_from(["mediacanon"]);
        assert_eq!(cli.mode(), Mode::Apply);
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_check_mode() {
        let cli = Cli::parse_from(["mediacanon", "--check", "--root", "/srv/site"]);
        assert_eq!(cli.mode(), Mode::Check);
        assert_eq!(cli.resolve_root().unwrap(), PathBuf::from("/srv/site"));
    }

    #[test]
    fn test_apply_and_check_conflict() {
        assert!(Cli::try_parse_from(["mediacanon", "--apply", "--check"]).is_err());
    }

    #[test]
    fn test_default_root_is_above_binary_dir() {
        let cli = Cli::parse_from(["mediacanon"]);
        let exe = std::env::current_exe().unwrap();
        assert_eq!(
            cli.resolve_root().unwrap(),
            exe.parent().unwrap().parent().unwrap()
        );
    }
}
