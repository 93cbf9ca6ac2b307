use std::path::PathBuf;

use clap::Parser;

/// A mascot that walks around the inside border of the screen and reads
/// out the latest line of a log.
#[derive(Debug, Parser)]
#[command(name = "edgepet", version, about)]
pub struct Cli {
    /// Log file whose newest line is shown in the speech bubble.
    pub target: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_required() {
        let err = Cli::try_parse_from(["edgepet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn accepts_exactly_one_target() {
        let cli = Cli::try_parse_from(["edgepet", "/var/log/app.log"]).unwrap();
        assert_eq!(cli.target, PathBuf::from("/var/log/app.log"));
        assert!(Cli::try_parse_from(["edgepet", "a.log", "b.log"]).is_err());
    }
}
