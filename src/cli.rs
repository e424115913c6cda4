use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::PathBuf;

use atty::Stream;
use clap::{
    Arg, ArgAction, ArgMatches, command, crate_authors, crate_description, crate_name,
    crate_version, value_parser,
};
use colored::Colorize;

use crate::config::{Config, expand_path};
use crate::constants::{
    APPEND_HELP, CONFIG_HELP, DRY_RUN_HELP, EXAMPLE_HELP, GLOB_HELP, LOCAL_LOGGING_HELP,
    LOG_FILE_HELP, OUTPUT_DIR_HELP, PAUSE_HELP, QUIET_HELP, RECURSIVE_HELP, VERBOSE_HELP,
    WINDOW_HELP, YES_HELP,
};
use crate::errors::Result;
use crate::logging::{LogLevel, format_message};
use crate::rename::RenameMode;
use crate::utils::find_project_folder;
use crate::workflow::{Command, CommandSource, ProcessingOptions, RenameSession};

/// Checks if stdout is a terminal and waits for user input if it is
///
/// This function is used to prevent the console window from closing
/// immediately after the program finishes when run from a GUI.
pub fn check_for_stdout_stream() {
    if atty::is(Stream::Stdout) {
        dont_disappear::enter_to_continue::default();
    }
}

/// Defines the command-line interface
pub fn build_cli() -> clap::Command {
    // positional directories to process
    let arg_directories = Arg::new("directories")
        .help("Directories to look for numbered files in")
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
        .default_value(".");

    // define arg for reading from a specific config file
    let arg_config = Arg::new("config")
        .short('c')
        .long("config")
        .help(CONFIG_HELP)
        .value_parser(value_parser!(PathBuf));

    // define arg for dry run
    let arg_dry = Arg::new("dry")
        .short('n')
        .long("dry")
        .help(DRY_RUN_HELP)
        .action(ArgAction::SetTrue);

    let arg_yes = Arg::new("yes")
        .short('y')
        .long("yes")
        .help(YES_HELP)
        .action(ArgAction::SetTrue);

    let arg_recursive = Arg::new("recursive")
        .short('r')
        .long("recursive")
        .help(RECURSIVE_HELP)
        .action(ArgAction::SetTrue);

    let arg_example = Arg::new("example")
        .short('e')
        .long("example")
        .help(EXAMPLE_HELP);

    let arg_output_dir = Arg::new("output_dir")
        .short('o')
        .long("output-dir")
        .help(OUTPUT_DIR_HELP);

    let arg_append = Arg::new("append")
        .short('a')
        .long("append")
        .help(APPEND_HELP)
        .action(ArgAction::SetTrue);

    let arg_glob = Arg::new("glob").short('g').long("glob").help(GLOB_HELP);

    let arg_min = Arg::new("min")
        .long("min")
        .help(WINDOW_HELP)
        .value_parser(value_parser!(i64));

    let arg_max = Arg::new("max")
        .long("max")
        .help(WINDOW_HELP)
        .value_parser(value_parser!(i64));

    // define arg for verbosity level
    let arg_verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help(VERBOSE_HELP)
        .action(ArgAction::Count);

    let arg_quiet = Arg::new("quiet")
        .short('q')
        .long("quiet")
        .help(QUIET_HELP)
        .action(ArgAction::SetTrue);

    // define arg for log file
    let log_file = Arg::new("log_file")
        .short('l')
        .long("log-file")
        .help(LOG_FILE_HELP);

    // define arg for local logging
    let log_locally = Arg::new("log_locally")
        .short('L')
        .long("log-locally")
        .help(LOCAL_LOGGING_HELP)
        .action(ArgAction::SetTrue);

    let arg_pause = Arg::new("pause")
        .long("pause")
        .help(PAUSE_HELP)
        .action(ArgAction::SetTrue);

    command!()
        .author(crate_authors!())
        .about(crate_description!())
        .name(crate_name!())
        .version(crate_version!())
        .arg(arg_directories)
        .arg(arg_config)
        .arg(arg_dry)
        .arg(arg_yes)
        .arg(arg_recursive)
        .arg(arg_example)
        .arg(arg_output_dir)
        .arg(arg_append)
        .arg(arg_glob)
        .arg(arg_min)
        .arg(arg_max)
        .arg(log_file)
        .arg(log_locally)
        .arg(arg_verbose)
        .arg(arg_quiet)
        .arg(arg_pause)
}

/// Parses the arguments of the current process
pub fn get_matches() -> ArgMatches {
    build_cli().get_matches()
}

/// Gets the verbosity level from the command-line arguments
///
/// Every `-v` raises the level by one step; `-q` limits the output to
/// warnings and errors regardless of `-v`.
pub fn get_verbosity(matches: &ArgMatches) -> LogLevel {
    LogLevel::from_occurrences(matches.get_count("verbose"), matches.get_flag("quiet"))
}

/// Gets the log file path, placed in the config directory unless `-L` is given
pub fn get_log_file(matches: &ArgMatches) -> Result<Option<PathBuf>> {
    let Some(filename) = matches.get_one::<String>("log_file") else {
        return Ok(None);
    };
    if matches.get_flag("log_locally") {
        Ok(Some(PathBuf::from(filename)))
    } else {
        let folder = find_project_folder()?;
        Ok(Some(folder.config_dir().join(filename)))
    }
}

pub fn get_config_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>("config").cloned()
}

pub fn get_processing_options(matches: &ArgMatches) -> ProcessingOptions {
    ProcessingOptions {
        directories: matches
            .get_many::<PathBuf>("directories")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        recursive: matches.get_flag("recursive"),
        dry_run: matches.get_flag("dry"),
    }
}

/// Overrides configured values with the ones given on the command line
pub fn apply_overrides(matches: &ArgMatches, config: &mut Config) -> anyhow::Result<()> {
    if let Some(example) = matches.get_one::<String>("example") {
        config.output.example = example.clone();
    }
    if let Some(directory) = matches.get_one::<String>("output_dir") {
        expand_path(directory)?;
        config.output.directory = Some(directory.clone());
    }
    if matches.get_flag("append") {
        config.output.mode = RenameMode::Append;
    }
    if let Some(glob) = matches.get_one::<String>("glob") {
        config.filter.glob = Some(glob.clone());
    }
    if let Some(min) = matches.get_one::<i64>("min") {
        config.search_window.min = *min;
    }
    if let Some(max) = matches.get_one::<i64>("max") {
        config.search_window.max = *max;
    }
    config.validate()
}

/// Reads one interactive command
///
/// * `y` confirms, `s` or `n` skips, `q` quits, `r` reverses the numbering
/// * a number picks that catalog convention
/// * `start:stop:step` re-slices the numbering
/// * `p FIRST:LAST` renames only part of the group, a lone `p` clears it
/// * `e TOKEN` continues numbering from `TOKEN`
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, argument) = match line.split_once(char::is_whitespace) {
        Some((word, argument)) => (word, argument.trim()),
        None => (line, ""),
    };

    match (word.to_lowercase().as_str(), argument.is_empty()) {
        ("y" | "yes", true) => Some(Command::Confirm),
        ("s" | "n" | "skip" | "no", true) => Some(Command::Skip),
        ("q" | "quit", true) => Some(Command::Quit),
        ("r" | "reverse", true) => Some(Command::Reverse),
        ("p", true) => Some(Command::ClearPartial),
        ("p", false) => argument.parse().ok().map(Command::Partial),
        ("e", false) => Some(Command::Example(argument.to_string())),
        (_, true) if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) => {
            word.parse().ok().map(Command::Choose)
        }
        (_, true) if word.contains(':') => word.parse().ok().map(Command::Reslice),
        _ => None,
    }
}

const PROMPT_HELP: &str = "[y]es, [s]kip, [q]uit, [r]everse, N: convention, start:stop:step, p FIRST:LAST, e TOKEN, ?";

/// Asks for each decision on a terminal
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        ConsolePrompt::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompt { input, output }
    }

    fn show(&mut self, session: &RenameSession<'_>) -> io::Result<()> {
        let title = session.group().to_string();
        writeln!(
            self.output,
            "\n{}",
            format_message(&title, &title.bold().to_string())
        )?;
        match session.plan() {
            Some(plan) => {
                for entry in plan.entries() {
                    writeln!(self.output, "  {entry}")?;
                }
            }
            None => writeln!(self.output, "  (no valid plan)")?,
        }
        if let Some(error) = session.last_error() {
            let message = error.to_string();
            writeln!(
                self.output,
                "  {}",
                format_message(&message, &message.red().to_string())
            )?;
        }
        Ok(())
    }

    fn show_menu(&mut self, session: &RenameSession<'_>) -> io::Result<()> {
        for line in session.catalog().menu() {
            writeln!(self.output, "  {line}")?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> CommandSource for ConsolePrompt<R, W> {
    fn next_command(&mut self, session: &RenameSession<'_>) -> anyhow::Result<Command> {
        self.show(session)?;
        loop {
            write!(self.output, "{PROMPT_HELP} > ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // End of input
                return Ok(Command::Quit);
            }
            if line.trim() == "?" {
                self.show_menu(session)?;
                continue;
            }
            match parse_command(&line) {
                Some(command) => return Ok(command),
                None => writeln!(self.output, "Unknown command: {}", line.trim())?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::MultifileGroup;
    use crate::naming::NamingCatalog;
    use crate::range::{LazyIndexableView, RangeDescriptor};
    use crate::rename::{PartialRange, RenameOptions};

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("y\n"), Some(Command::Confirm));
        assert_eq!(parse_command(" N "), Some(Command::Skip));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("r"), Some(Command::Reverse));
        assert_eq!(parse_command("3"), Some(Command::Choose(3)));
        assert_eq!(
            parse_command("1::2"),
            Some(Command::Reslice(RangeDescriptor::new(Some(1), None, 2)))
        );
        assert_eq!(
            parse_command("p 2:3"),
            Some(Command::Partial(PartialRange::new("2", "3")))
        );
        assert_eq!(parse_command("p"), Some(Command::ClearPartial));
        assert_eq!(
            parse_command("e 001"),
            Some(Command::Example("001".to_string()))
        );
        assert_eq!(parse_command("e"), None);
        assert_eq!(parse_command("y now"), None);
        assert_eq!(parse_command("maybe"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_overrides_are_validated() {
        let matches = build_cli()
            .try_get_matches_from(["renumber", "--example", "001", "--append", "--max", "4"])
            .unwrap();
        let mut config = Config::default();
        apply_overrides(&matches, &mut config).unwrap();
        assert_eq!(config.output.example, "001");
        assert_eq!(config.output.mode, RenameMode::Append);
        assert_eq!(config.search_window.max, 4);

        let matches = build_cli()
            .try_get_matches_from(["renumber", "--min", "5"])
            .unwrap();
        assert!(apply_overrides(&matches, &mut Config::default()).is_err());
    }

    #[test]
    fn test_processing_options_from_arguments() {
        let matches = build_cli()
            .try_get_matches_from(["renumber", "-n", "-r", "a", "b"])
            .unwrap();
        let options = get_processing_options(&matches);
        assert!(options.dry_run);
        assert!(options.recursive);
        assert_eq!(options.directories, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(get_verbosity(&matches), LogLevel::Info);
    }

    #[test]
    fn test_console_prompt_reprompts_on_unknown_input() {
        let catalog = NamingCatalog::standard();
        let group = MultifileGroup::new(
            "/media",
            "clip",
            "-",
            LazyIndexableView::from_values(["1", "2"]),
            "",
            ".mp4",
        );
        let naming = catalog.continue_from_example("01").unwrap();
        let session = RenameSession::new(&catalog, group, RenameOptions::builder(naming).build());

        let mut output = Vec::new();
        let mut prompt = ConsolePrompt::new("what\n?\ny\n".as_bytes(), &mut output);
        assert_eq!(prompt.next_command(&session).unwrap(), Command::Confirm);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("clip-1.mp4 -> clip01.mp4"));
        assert!(shown.contains("Unknown command: what"));
        assert!(shown.contains(" 1. "));

        let mut prompt = ConsolePrompt::new("".as_bytes(), Vec::new());
        assert_eq!(prompt.next_command(&session).unwrap(), Command::Quit);
    }
}
