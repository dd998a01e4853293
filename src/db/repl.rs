//! Interactive REPL (Read-Eval-Print Loop) for txstore.

use std::io::{self, BufRead, Write};

use super::api::{Database, DatabaseError, DatabaseResult};
use super::demo::run_demo;

/// REPL configuration.
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string.
    pub prompt: String,
    /// Show timing information.
    pub timing: bool,
    /// Echo each command before its output (useful for piped input).
    pub echo: bool,
    /// Print the banner on start.
    pub banner: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "txstore> ".into(),
            timing: false,
            echo: false,
            banner: true,
        }
    }
}

impl ReplConfig {
    /// Settings for non-interactive use: no prompt, no banner.
    pub fn batch() -> Self {
        Self {
            prompt: String::new(),
            banner: false,
            ..Default::default()
        }
    }

    /// Set the prompt.
    pub fn prompt(mut self, value: impl Into<String>) -> Self {
        self.prompt = value.into();
        self
    }

    /// Set timing flag.
    pub fn timing(mut self, value: bool) -> Self {
        self.timing = value;
        self
    }

    /// Set echo flag.
    pub fn echo(mut self, value: bool) -> Self {
        self.echo = value;
        self
    }
}

/// The interactive REPL.
pub struct Repl {
    db: Database,
    config: ReplConfig,
    history: Vec<String>,
}

impl Repl {
    /// Create a new REPL with the given database.
    pub fn new(db: Database) -> Self {
        Self::with_config(db, ReplConfig::default())
    }

    /// Create a REPL with custom configuration.
    pub fn with_config(db: Database, config: ReplConfig) -> Self {
        Self {
            db,
            config,
            history: Vec::new(),
        }
    }

    /// The database driven by this REPL.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run the REPL on stdin/stdout.
    pub fn run(&mut self) -> DatabaseResult<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the REPL until EOF or `.quit`.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> DatabaseResult<()> {
        if self.config.banner {
            self.print_banner(&mut out)?;
        }

        loop {
            write!(out, "{}", self.config.prompt)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF.
                if self.config.banner {
                    writeln!(out, "\nGoodbye!")?;
                }
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.config.echo {
                writeln!(out, "{}", line)?;
            }

            self.history.push(line.to_string());

            if self.is_command(line) {
                if self.handle_command(line, &mut out)? {
                    break;
                }
                continue;
            }

            self.execute_line(line, &mut out)?;
        }

        out.flush()?;
        Ok(())
    }

    /// Execute one data command, printing its result or error.
    fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> DatabaseResult<()> {
        let start = std::time::Instant::now();
        match self.db.execute(line) {
            Ok(outcome) => {
                let text = outcome.to_string();
                if !text.is_empty() {
                    writeln!(out, "{}", text)?;
                }
            }
            Err(e @ DatabaseError::Transaction(_)) => writeln!(out, "{}", e)?,
            Err(e) if e.is_recoverable() => writeln!(out, "Error: {}", e)?,
            Err(e) => return Err(e),
        }
        if self.config.timing {
            writeln!(out, "Time: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }

    fn print_banner<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "txstore v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "In-memory key-value store with nested transactions")?;
        writeln!(out, "Type .help for commands")?;
        writeln!(out)
    }

    fn is_command(&self, input: &str) -> bool {
        input.starts_with('.') || input.starts_with('\\')
    }

    /// Handle a meta command. Returns `true` when the REPL should exit.
    fn handle_command<W: Write>(&mut self, cmd: &str, out: &mut W) -> DatabaseResult<bool> {
        let cmd = cmd.trim_start_matches(&['.', '\\'][..]);
        let command = cmd.split_whitespace().next().map(|s| s.to_lowercase());

        match command.as_deref() {
            Some("help") | Some("h") | Some("?") => {
                self.print_help(out)?;
            }
            Some("quit") | Some("exit") | Some("q") => {
                return Ok(true);
            }
            Some("status") => {
                self.print_status(out)?;
            }
            Some("history") => {
                self.print_history(out)?;
            }
            Some("timing") => {
                self.config.timing = !self.config.timing;
                writeln!(out, "Timing: {}", if self.config.timing { "on" } else { "off" })?;
            }
            Some("demo") => {
                run_demo(out)?;
            }
            Some(cmd) => {
                writeln!(out, "Unknown command: .{}", cmd)?;
                writeln!(out, "Type .help for available commands")?;
            }
            None => {}
        }

        Ok(false)
    }

    fn print_help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Commands:")?;
        writeln!(out, "  .help, .h, .?           Show this help message")?;
        writeln!(out, "  .quit, .exit, .q        Exit the REPL")?;
        writeln!(out, "  .status                 Show keys and open transactions")?;
        writeln!(out, "  .history                Show command history")?;
        writeln!(out, "  .timing                 Toggle timing display")?;
        writeln!(out, "  .demo                   Run the sample transaction sequences")?;
        writeln!(out)?;
        writeln!(out, "Statements:")?;
        writeln!(out, "  SET <key> <integer>")?;
        writeln!(out, "  GET <key>")?;
        writeln!(out, "  UNSET <key>")?;
        writeln!(out, "  BEGIN / COMMIT / ROLLBACK")?;
        writeln!(out)
    }

    fn print_status<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let stats = self.db.stats();
        writeln!(out, "Keys: {}", stats.keys)?;
        writeln!(out, "Commands: {} ({} mutating)", stats.commands, stats.mutations)?;
        writeln!(out, "Open Transactions: {}", stats.open_transactions)?;
        for frame in self.db.store().frames() {
            writeln!(
                out,
                "  #{} {} opened {} ({} key(s) touched)",
                frame.depth,
                frame.id,
                frame.opened_at.format("%H:%M:%S%.3f"),
                frame.touched
            )?;
        }
        Ok(())
    }

    fn print_history<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Command History:")?;
        for (i, cmd) in self.history.iter().enumerate() {
            writeln!(out, "  {}: {}", i + 1, cmd)?;
        }
        Ok(())
    }
}
