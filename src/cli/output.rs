//! Handles all user-facing output for the CLI.
//!
//! Colour goes through `termcolor` and is switched off when stdout is not a terminal.
//! JSON goes through `serde_json`.

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::macros::{ExpansionStep, MacroDefinition};
use crate::preprocessor::RunSummary;

/// Colour only when stdout is a terminal, so piped output stays plain.
fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn heading() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Yellow)).set_bold(true);
    spec
}

fn colour(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    spec
}

/// Prints the macro expansion trace, one block per expansion, indented by depth.
pub fn print_trace(steps: &[ExpansionStep]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    if steps.is_empty() {
        writeln!(stdout, "No macro expansions.")?;
        return Ok(());
    }

    for (i, step) in steps.iter().enumerate() {
        let indent = "  ".repeat(step.depth);
        stdout.set_color(&heading())?;
        write!(stdout, "{indent}--- Step {}: {} ", i, step.macro_name)?;
        stdout.reset()?;
        writeln!(stdout, "(line {}, depth {})", step.call_line, step.depth)?;

        for binding in &step.bindings {
            stdout.set_color(&colour(Color::Green))?;
            write!(stdout, "{indent}  {}", binding.formal)?;
            stdout.reset()?;
            writeln!(stdout, " = {}", binding.value)?;
        }
        for (label, renamed) in &step.renames {
            stdout.set_color(&colour(Color::Cyan))?;
            write!(stdout, "{indent}  {label}")?;
            stdout.reset()?;
            writeln!(stdout, " -> {renamed}")?;
        }
    }
    Ok(())
}

/// Prints captured definitions in source order.
pub fn print_macros(definitions: &[&MacroDefinition]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    if definitions.is_empty() {
        writeln!(stdout, "  No macros defined.")?;
        return Ok(());
    }

    for def in definitions {
        let params: Vec<String> = def
            .params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{}={}", p.name, default),
                None => p.name.clone(),
            })
            .collect();
        stdout.set_color(&heading())?;
        write!(stdout, "  {}", def.name)?;
        stdout.reset()?;
        writeln!(
            stdout,
            " {}  (lines {}-{})",
            params.join(", "),
            def.start_line,
            def.end_line
        )?;
        if !def.labels.is_empty() {
            let labels: Vec<&str> = def.labels.names().collect();
            stdout.set_color(&colour(Color::Cyan))?;
            writeln!(stdout, "    labels: {}", labels.join(", "))?;
            stdout.reset()?;
        }
    }
    Ok(())
}

/// Writes any serializable value as pretty JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

/// Reports a finished `expand` run.
pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(stdout, "Wrote")?;
    stdout.reset()?;
    writeln!(
        stdout,
        " {} ({} lines, {} macros, {} expansions)",
        summary.output_path.display(),
        summary.lines_written,
        summary.macros_defined,
        summary.expansions
    )
}
