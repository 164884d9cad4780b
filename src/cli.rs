use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taograb")]
#[command(about = "Fetch taoiptv's session-gated channel list and write an M3U playlist")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Read the JSON configuration from a file instead of $TV_ACCOUNTS
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Playlist output path
    #[arg(short, long, default_value = "taoiptv.m3u", value_name = "FILE")]
    pub output: PathBuf,

    /// Persisted browser session state
    #[arg(long, default_value = "taograb-state.json", value_name = "FILE")]
    pub state: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["taograb"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        assert_eq!(cli.output, PathBuf::from("taoiptv.m3u"));
        assert_eq!(cli.state, PathBuf::from("taograb-state.json"));
    }

    #[test]
    fn parse_output_override() {
        let cli = Cli::try_parse_from(["taograb", "-o", "/tmp/list.m3u"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("/tmp/list.m3u"));
    }

    #[test]
    fn verbose_flag_short_and_long() {
        let short = Cli::try_parse_from(["taograb", "-v"]).unwrap();
        assert_eq!(short.verbose, 1);

        let long = Cli::try_parse_from(["taograb", "--verbose"]).unwrap();
        assert_eq!(long.verbose, 1);

        let double = Cli::try_parse_from(["taograb", "-vv"]).unwrap();
        assert_eq!(double.verbose, 2);
    }

    #[test]
    fn parse_config_file() {
        let cli = Cli::try_parse_from(["taograb", "--config", "accounts.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("accounts.json")));
    }

    #[test]
    fn unknown_flag_fails() {
        assert!(Cli::try_parse_from(["taograb", "--retry"]).is_err());
    }
}
