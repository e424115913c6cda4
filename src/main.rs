use std::process::ExitCode;

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use human_panic::setup_panic;
use log::debug;

use renumber::cli::{
    ConsolePrompt, apply_overrides, check_for_stdout_stream, get_config_path, get_log_file,
    get_matches, get_processing_options, get_verbosity,
};
use renumber::config::read_or_default;
use renumber::logging::{format_message, init_logger};
use renumber::workflow::{AutoConfirm, CommandSource, WorkflowContext, process_directories};

fn main() -> ExitCode {
    setup_panic!();

    let matches = get_matches();
    let code = match run(&matches) {
        Ok(context) if context.stats.errors == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    };

    if matches.get_flag("pause") {
        check_for_stdout_stream();
    }
    code
}

fn run(matches: &ArgMatches) -> Result<WorkflowContext> {
    let log_file = get_log_file(matches)?;
    init_logger(get_verbosity(matches), log_file.as_deref())?;

    let mut config = read_or_default(get_config_path(matches).as_deref())?;
    apply_overrides(matches, &mut config)?;
    debug!("Using configuration: {config:?}");

    let options = get_processing_options(matches);
    let mut commands: Box<dyn CommandSource> = if matches.get_flag("yes") {
        Box::new(AutoConfirm)
    } else {
        Box::new(ConsolePrompt::stdin())
    };
    let context = process_directories(&config, &options, commands.as_mut())?;

    print_summary(&context);
    Ok(context)
}

fn print_summary(context: &WorkflowContext) {
    if context.dry_run && !context.planned_operations.is_empty() {
        println!("\nPlanned renames:");
        println!("----------------");
        let mut current_group = "";
        for op in &context.planned_operations {
            if op.group != current_group {
                println!("{}", op.group);
                current_group = &op.group;
            }
            println!("  From: {}", op.source.display());
            println!("  To:   {}", op.destination.display());
        }
        println!("\nRun without --dry to execute these renames.");
    }

    let stats = &context.stats;
    let heading = if context.aborted {
        "Summary (stopped early):"
    } else {
        "Summary:"
    };
    println!("\n{}", format_message(heading, &heading.bold().to_string()));
    println!("  Directories scanned: {}", stats.directories_scanned);
    println!("  Groups found:        {}", stats.groups_found);
    println!("  Groups renamed:      {}", stats.groups_renamed);
    println!("  Groups skipped:      {}", stats.groups_skipped);
    println!("  Files moved:         {}", stats.files_moved);
    if stats.files_copied > 0 {
        println!("  Copied across disks: {}", stats.files_copied);
    }
    if stats.errors > 0 {
        let errors = format!("  Errors:              {}", stats.errors);
        println!("{}", format_message(&errors, &errors.red().to_string()));
    }
}
