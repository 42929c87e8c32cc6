// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL (Read-Eval-Print Loop) for tally.
//!
//! Every entry is compiled on its own, but declarations and variable values
//! carry over: `int x;` on one line and `x = 3; print x;` on the next work.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Editor, Helper};
use tally_core::{Bytecode, Engine};
use tracing::debug;

use crate::config::Config;

/// History file name under the data directory
const HISTORY_FILE: &str = "history";

/// Words offered for completion and hints
const KEYWORDS: &[&str] = &["int", "real", "if", "else", "while", "print", "input"];

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Vars,
    Listing,
    Reset,
    Load,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => Some((ReplCommand::Help, arg)),
            "exit" | "quit" | "q" => Some((ReplCommand::Exit, arg)),
            "clear" | "cls" => Some((ReplCommand::Clear, arg)),
            "vars" => Some((ReplCommand::Vars, arg)),
            "listing" => Some((ReplCommand::Listing, arg)),
            "reset" => Some((ReplCommand::Reset, arg)),
            "load" | "l" => Some((ReplCommand::Load, arg)),
            _ => None,
        }
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".vars", "List declared variables and their values"),
            (".listing", "Toggle printing the bytecode of each entry"),
            (".reset", "Forget every declaration and value"),
            (".load <file>", "Load and execute a tally file"),
        ]
    }
}

/// Helper struct for rustyline that provides completion, hints, and validation
struct TallyHelper {
    /// Keywords and dot commands for completion
    words: Vec<String>,
    color: bool,
}

impl TallyHelper {
    fn new(color: bool) -> Self {
        let words = KEYWORDS
            .iter()
            .copied()
            .chain(ReplCommand::all_commands().iter().map(|&(cmd, _)| {
                cmd.split_whitespace().next().unwrap_or(cmd)
            }))
            .map(String::from)
            .collect();

        Self { words, color }
    }
}

/// Byte offset where the word ending at `pos` starts.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rfind(|&(_, c)| !c.is_alphanumeric() && c != '_' && c != '.')
        .map_or(0, |(i, c)| i + c.len_utf8())
}

impl Completer for TallyHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let word = &line[word_start(line, pos)..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches: Vec<Pair> = self
            .words
            .iter()
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for TallyHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }

        let word = &line[word_start(line, pos)..];
        if word.len() < 2 {
            return None;
        }

        self.words
            .iter()
            .find(|kw| kw.starts_with(word) && kw.len() > word.len())
            .map(|kw| {
                let rest = &kw[word.len()..];
                if self.color {
                    rest.dimmed().to_string()
                } else {
                    rest.to_string()
                }
            })
    }
}

impl Highlighter for TallyHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !self.color || line.trim_start().starts_with('.') {
            return Cow::Borrowed(line);
        }

        let mut result = String::with_capacity(line.len() * 2);
        let mut chars = line.char_indices().peekable();
        let mut current_word = String::new();

        while let Some((i, c)) = chars.next() {
            if c.is_alphanumeric() || c == '_' || (c == '.' && !current_word.is_empty()) {
                current_word.push(c);
                continue;
            }
            if !current_word.is_empty() {
                result.push_str(&highlight_word(&current_word));
                current_word.clear();
            }

            // The rest of the line is a comment
            if c == '/' && matches!(chars.peek(), Some((_, '/'))) {
                result.push_str(&(&line[i..]).dimmed().to_string());
                return Cow::Owned(result);
            }

            let colored = match c {
                '(' | ')' | '{' | '}' => c.to_string().yellow().to_string(),
                '+' | '-' | '*' | '/' | '=' | '<' | '>' | '!' => c.to_string().cyan().to_string(),
                _ => c.to_string(),
            };
            result.push_str(&colored);
        }

        if !current_word.is_empty() {
            result.push_str(&highlight_word(&current_word));
        }

        Cow::Owned(result)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Borrowed(hint)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.color
    }
}

fn highlight_word(word: &str) -> String {
    match word {
        "int" | "real" => word.blue().bold().to_string(),
        "if" | "else" | "while" | "print" | "input" => word.magenta().bold().to_string(),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => word.yellow().to_string(),
        _ => word.to_string(),
    }
}

impl Validator for TallyHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();

        if input.trim_start().starts_with('.') {
            return Ok(ValidationResult::Valid(None));
        }

        if !is_balanced(input) {
            return Ok(ValidationResult::Incomplete);
        }

        // A trailing operator or opening delimiter expects more input
        let trimmed = strip_comment(input).trim_end();
        if trimmed.ends_with(['+', '-', '*', '/', '=', '<', '>', '(', '{']) {
            return Ok(ValidationResult::Incomplete);
        }

        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for TallyHelper {}

/// Drop a trailing `//` comment from the last line.
fn strip_comment(input: &str) -> &str {
    let line_start = input.rfind('\n').map(|i| i + 1).unwrap_or(0);
    match input[line_start..].find("//") {
        Some(i) => &input[..line_start + i],
        None => input,
    }
}

/// Check if braces and parentheses are balanced, ignoring comments
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();

    for line in input.lines() {
        let code = line.split("//").next().unwrap_or("");
        for c in code.chars() {
            match c {
                '(' => stack.push(')'),
                '{' => stack.push('}'),
                ')' | '}' => {
                    if stack.pop() != Some(c) {
                        return true; // Unbalanced but we should let the parser handle the error
                    }
                }
                _ => {}
            }
        }
    }

    stack.is_empty()
}

/// The interactive REPL for tally
pub struct Repl {
    engine: Engine,
    editor: Editor<TallyHelper, DefaultHistory>,
    history_path: PathBuf,
    listing: bool,
    color: bool,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: &Config) -> rustyline::Result<Self> {
        let editor_config = rustyline::Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(config.history_size)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(editor_config)?;
        editor.set_helper(Some(TallyHelper::new(config.color)));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tally")
            .join(HISTORY_FILE);

        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        // A missing history file is normal on first start
        let _ = editor.load_history(&history_path);

        Ok(Self {
            engine: Engine::new(),
            editor,
            history_path,
            listing: config.listing,
            color: config.color,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    if trimmed.starts_with('.') {
                        match ReplCommand::parse(trimmed) {
                            Some((cmd, arg)) => match self.execute_command(cmd, arg) {
                                CommandResult::Continue => continue,
                                CommandResult::Exit => break,
                            },
                            None => {
                                self.report(&anyhow::anyhow!(
                                    "unknown command '{}', try .help",
                                    trimmed
                                ));
                                continue;
                            }
                        }
                    }

                    self.eval_and_print(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", self.paint_dim("^C"));
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", self.paint_dim("^D"));
                    break;
                }
                Err(err) => {
                    self.report(&anyhow::anyhow!(err));
                    break;
                }
            }
        }

        if let Err(err) = self.editor.save_history(&self.history_path) {
            debug!(%err, path = %self.history_path.display(), "could not save history");
        }

        Ok(())
    }

    fn print_banner(&self) {
        let version = env!("CARGO_PKG_VERSION");
        if self.color {
            println!(
                "{} {} {}",
                "tally".bright_cyan().bold(),
                "v".dimmed(),
                version.bright_yellow()
            );
            println!(
                "{} {} {}",
                "Type".dimmed(),
                ".help".cyan(),
                "for available commands".dimmed()
            );
        } else {
            println!("tally v{}", version);
            println!("Type .help for available commands");
        }
    }

    fn format_prompt(&self) -> String {
        if self.color {
            format!("{} ", "tally>".bright_green().bold())
        } else {
            "tally> ".to_string()
        }
    }

    fn paint_dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Vars => self.print_vars(),
            ReplCommand::Listing => {
                self.listing = !self.listing;
                println!(
                    "listing {}",
                    if self.listing { "on" } else { "off" }
                );
            }
            ReplCommand::Reset => {
                self.engine.reset();
                println!("{}", self.paint_dim("all declarations forgotten"));
            }
            ReplCommand::Load => match arg {
                Some(path) => self.load_file(Path::new(path)),
                None => self.report(&anyhow::anyhow!(".load requires a file path")),
            },
        }
        CommandResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("REPL Commands:");
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            if self.color {
                println!("  {:16} {}", cmd.cyan(), desc.dimmed());
            } else {
                println!("  {:16} {}", cmd, desc);
            }
        }

        println!();
        println!("Declarations and values persist between entries.");
        println!("An entry that fails to compile declares nothing.");
        println!();
    }

    fn print_vars(&self) {
        let symbols = self.engine.analyzer().symbols();
        if symbols.is_empty() {
            println!("{}", self.paint_dim("no variables declared"));
            return;
        }

        let mut names: Vec<_> = symbols.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));

        for (name, ty) in names {
            let value = match self.engine.vm().get(name) {
                Some(value) => tally_core::format_number(value),
                None => format!("0.0 {}", self.paint_dim("(unassigned)")),
            };
            println!("  {} {} = {}", ty, name, value);
        }
    }

    fn load_file(&mut self, path: &Path) {
        match std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
        {
            Ok(source) => self.eval_and_print(&source),
            Err(err) => self.report(&err),
        }
    }

    fn eval_and_print(&mut self, input: &str) {
        let bytecode = match self.engine.compile(input) {
            Ok(bytecode) => bytecode,
            Err(err) => return self.report(&anyhow::Error::from(err)),
        };

        if self.listing {
            self.print_listing(&bytecode);
        }

        let result = self
            .engine
            .execute(&bytecode, io::stdin().lock(), io::stdout().lock());
        if let Err(err) = result {
            self.report(&anyhow::Error::from(err));
        }
    }

    fn print_listing(&self, bytecode: &Bytecode) {
        for line in bytecode.to_string().lines() {
            println!("{}", self.paint_dim(line));
        }
    }

    fn report(&self, err: &anyhow::Error) {
        crate::print_error(self.color, err);
    }
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}
