use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use cmut_config::CmutConfig;
use cmut_rewrite::{CollisionPolicy, Strategy};

/// Insertion strategy as spelled on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    AliasGlobals,
    UnusedLocals,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::AliasGlobals => Self::AliasGlobals,
            StrategyArg::UnusedLocals => Self::UnusedLocals,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CollisionArg {
    Fail,
    Skip,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(value: CollisionArg) -> Self {
        match value {
            CollisionArg::Fail => Self::Fail,
            CollisionArg::Skip => Self::Skip,
        }
    }
}

/// Top-level CLI parser for the `cmut` binary.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser)]
#[command(
    name = "cmut",
    version,
    about = "cmut - insert declarations into C sources, one scope at a time"
)]
pub struct Cli {
    /// C source file to mutate
    pub input: PathBuf,

    /// Where to write the result (stdout when absent or empty)
    pub output: Option<String>,

    /// Insertion strategy (overrides config)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Suffix for synthesized alias names (overrides config)
    #[arg(long)]
    pub alias_suffix: Option<String>,

    /// What to do when a synthesized name is taken (overrides config)
    #[arg(long, value_enum)]
    pub on_collision: Option<CollisionArg>,

    /// Treat function parameters as eligible declarations
    #[arg(long)]
    pub include_parameters: bool,

    /// Treat declarations from included files as eligible
    #[arg(long)]
    pub include_foreign: bool,

    /// Additional include directory (repeatable)
    #[arg(short = 'I', long = "include-dir")]
    pub include_dirs: Vec<PathBuf>,

    /// Print the collected scope tree as JSON on stderr
    #[arg(long)]
    pub dump_scopes: bool,

    /// Quiet mode (errors only, no status line)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Destination file, `None` for stdout.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(Path::new)
    }

    /// Layer command-line flags over the loaded configuration.
    pub fn apply_overrides(&self, config: &mut CmutConfig) {
        if let Some(strategy) = self.strategy {
            config.mutate.strategy = strategy.into();
        }
        if let Some(suffix) = &self.alias_suffix {
            config.mutate.alias_suffix.clone_from(suffix);
        }
        if let Some(policy) = self.on_collision {
            config.mutate.on_collision = policy.into();
        }
        config.mutate.include_parameters |= self.include_parameters;
        config.mutate.include_foreign |= self.include_foreign;
        config
            .frontend
            .include_paths
            .extend(self.include_dirs.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn input_only_writes_to_stdout() {
        let cli = Cli::try_parse_from(["cmut", "in.c"]).expect("cli should parse");
        assert_eq!(cli.input, PathBuf::from("in.c"));
        assert_eq!(cli.output_path(), None);
    }

    #[test]
    fn empty_output_means_stdout() {
        let cli = Cli::try_parse_from(["cmut", "in.c", ""]).expect("cli should parse");
        assert_eq!(cli.output_path(), None);

        let cli = Cli::try_parse_from(["cmut", "in.c", "out.c"]).expect("cli should parse");
        assert_eq!(cli.output_path(), Some(Path::new("out.c")));
    }

    #[test]
    fn missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["cmut"]).is_err());
        assert!(Cli::try_parse_from(["cmut", "a.c", "b.c", "c.c"]).is_err());
    }

    #[test]
    fn strategy_rejects_unknown_value() {
        assert!(Cli::try_parse_from(["cmut", "--strategy", "shuffle", "in.c"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "cmut",
            "--strategy",
            "unused-locals",
            "--alias-suffix",
            "_ptr",
            "--on-collision",
            "skip",
            "--include-foreign",
            "-I",
            "/opt/include",
            "in.c",
        ])
        .expect("cli should parse");

        let mut config = CmutConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.mutate.strategy, Strategy::UnusedLocals);
        assert_eq!(config.mutate.alias_suffix, "_ptr");
        assert_eq!(config.mutate.on_collision, CollisionPolicy::Skip);
        assert!(config.mutate.include_foreign);
        assert!(!config.mutate.include_parameters);
        assert_eq!(
            config.frontend.include_paths,
            vec![PathBuf::from("/opt/include")]
        );
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["cmut", "in.c"]).expect("cli should parse");
        let mut config = CmutConfig::default();
        config.mutate.include_parameters = true;
        cli.apply_overrides(&mut config);
        assert_eq!(config.mutate.strategy, Strategy::AliasGlobals);
        assert!(config.mutate.include_parameters);
    }
}
