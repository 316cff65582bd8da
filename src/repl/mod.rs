//! Interactive console for entering and querying circuits.
//!
//! The console reads one command per line from any [`BufRead`] and writes
//! to any [`Write`], so the binary drives it with stdin/stdout and tests
//! with in-memory buffers. Errors in a command are reported and the session
//! carries on with its state unchanged; only console I/O failures end it.

mod format;
mod session;

use std::io::{BufRead, Write};
use std::path::Path;

use crossterm::cursor::{MoveTo, MoveToPreviousLine};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::circuit::Scalar;
use crate::dsl::{self, Command, PrintTarget, Quantity, Query, Statement, Target};
use crate::error::{NodalError, Result};
use crate::solver::DcAnalysis;

pub use format::{engineering, engineering_short, to_f64, Painter};
pub use session::Session;

/// Default number of decimals in long engineering notation.
pub const DEFAULT_PRECISION: usize = 6;

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Emit ANSI colours and cursor control.
    pub color: bool,
    /// Decimals shown for voltages and currents.
    pub precision: usize,
    /// Print the welcome banner on start.
    pub banner: bool,
    /// Print the contents of imported files.
    pub echo_imports: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            color: true,
            precision: DEFAULT_PRECISION,
            banner: true,
            echo_imports: true,
        }
    }
}

impl ReplConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable colours and cursor control.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Set the decimals shown for voltages and currents.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Show or skip the welcome banner.
    pub fn with_banner(mut self, banner: bool) -> Self {
        self.banner = banner;
        self
    }

    /// Show or skip the contents of imported files.
    pub fn with_echo_imports(mut self, echo_imports: bool) -> Self {
        self.echo_imports = echo_imports;
        self
    }

    /// No banner and no file echo.
    pub fn quiet(self) -> Self {
        self.with_banner(false).with_echo_imports(false)
    }
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The read-eval-print loop.
pub struct Repl<R, W> {
    input: R,
    output: W,
    config: ReplConfig,
    painter: Painter,
    session: Session,
    line: usize,
    greeted: bool,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    /// Create a console reading commands from `input` and writing to `output`.
    pub fn new(input: R, output: W, config: ReplConfig) -> Self {
        let painter = Painter::new(config.color);
        Self {
            input,
            output,
            config,
            painter,
            session: Session::new(),
            line: 0,
            greeted: false,
        }
    }

    /// The circuit session being edited.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print the welcome banner once, if configured.
    pub fn greet(&mut self) -> Result<()> {
        if self.config.banner && !self.greeted {
            self.print_banner()?;
        }
        self.greeted = true;
        Ok(())
    }

    /// Run until `END`/`EXIT` or end of input.
    pub fn run(&mut self) -> Result<()> {
        self.greet()?;

        while let Some(text) = self.read_line()? {
            if self.execute_line(&text)? == Flow::Exit {
                break;
            }
        }

        self.output.flush().map_err(NodalError::console)
    }

    /// Parse and execute one line, reporting any non-console error.
    pub fn execute_line(&mut self, text: &str) -> Result<Flow> {
        let outcome = dsl::parse_command(text, self.line).and_then(|command| self.execute(command, text));
        self.recover(outcome)
    }

    /// Import a file like the `IMPORT` command, reporting failures.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let outcome = self.import_file(path).map(|_| Flow::Continue);
        self.recover(outcome).map(|_| ())
    }

    fn recover(&mut self, outcome: Result<Flow>) -> Result<Flow> {
        match outcome {
            Ok(flow) => Ok(flow),
            Err(err @ NodalError::ConsoleError { .. }) => Err(err),
            Err(err) => {
                self.report(&err)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Import a netlist file into the session.
    ///
    /// The file is applied all or nothing. Returns the number of branches added.
    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        let contents = dsl::read_file(path)?;
        if self.config.echo_imports {
            let title = format!("Contents of {}:", path.display());
            for line in format::boxed(&title, &contents) {
                let painted = self.painter.info(&line);
                self.write_line(&painted)?;
            }
        }

        let statements = dsl::parse_netlist(&contents)?;
        let added = self.session.circuit_mut().import(statements)?;
        let noun = if added == 1 { "branch" } else { "branches" };
        let message = self.painter.info(&format!("Imported {added} {noun}."));
        self.write_line(&message)?;
        Ok(added)
    }

    fn execute(&mut self, command: Command, text: &str) -> Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Exit => return Ok(Flow::Exit),
            Command::Help => {
                let help = self.painter.banner(&format::help_text());
                self.write_line(&help)?;
            }
            Command::New => {
                self.session.reset();
                let message = self.painter.banner("Memory cleared.");
                self.write_line(&message)?;
            }
            Command::Clear => {
                if self.painter.color() {
                    queue!(self.output, Clear(ClearType::All), MoveTo(0, 0)).map_err(NodalError::console)?;
                }
                self.print_banner()?;
            }
            Command::Import(path) => {
                self.import_file(Path::new(&path))?;
            }
            Command::Print(target) => self.print(target)?,
            Command::Edit(assignment) => {
                self.session.circuit_mut().edit_value(&assignment.id, assignment.value)?;
                self.echo(text)?;
            }
            Command::EditBranch(number) => self.edit_branch(number)?,
            Command::Return(query) => self.query(query)?,
            Command::Statement(statement) => {
                self.session.apply(statement)?;
                self.echo(text)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn edit_branch(&mut self, number: usize) -> Result<()> {
        if number == 0 || number > self.session.circuit().len() {
            return Err(NodalError::BranchNotFound { number });
        }

        self.write("> ")?;
        self.output.flush().map_err(NodalError::console)?;
        let text = self
            .read_line()?
            .ok_or_else(|| NodalError::parse(self.line, "EDIT BRANCH needs a replacement branch"))?;

        match dsl::parse_statement(&text, self.line)? {
            Statement::Branch(def) => {
                self.session.circuit_mut().replace_branch(number, def)?;
                self.echo(&format!("> {}", text.trim()))
            }
            Statement::Assign(_) => Err(NodalError::parse(
                self.line,
                "EDIT BRANCH expects START COMP[=VALUE] END",
            )),
        }
    }

    fn print(&mut self, target: PrintTarget) -> Result<()> {
        let circuit = self.session.circuit();
        let lines = match target {
            PrintTarget::Branches => format::branch_table(circuit),
            PrintTarget::Components => format::component_list(circuit),
        };
        for line in lines {
            let painted = self.painter.info(&line);
            self.write_line(&painted)?;
        }
        Ok(())
    }

    fn query(&mut self, query: Query) -> Result<()> {
        let painter = self.painter;
        let precision = self.config.precision;
        let analysis = self.session.analysis()?;
        let lines = render_query(analysis, &query, painter, precision)?;
        for line in lines {
            writeln!(self.output, "{line}").map_err(NodalError::console)?;
        }
        Ok(())
    }

    fn print_banner(&mut self) -> Result<()> {
        for line in format::banner_lines() {
            let painted = self.painter.banner(&line);
            self.write_line(&painted)?;
        }
        Ok(())
    }

    /// Re-print an accepted line highlighted, over the typed one on a terminal.
    fn echo(&mut self, text: &str) -> Result<()> {
        if !self.painter.color() {
            return Ok(());
        }
        queue!(self.output, MoveToPreviousLine(1), Clear(ClearType::CurrentLine)).map_err(NodalError::console)?;
        let painted = self.painter.echo(text.trim());
        self.write_line(&painted)
    }

    fn report(&mut self, err: &NodalError) -> Result<()> {
        let painted = self.painter.error(&format!("ERROR: {err}"));
        self.write_line(&painted)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut text = String::new();
        let read = self.input.read_line(&mut text).map_err(NodalError::console)?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(text))
    }

    fn write(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{text}").map_err(NodalError::console)
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").map_err(NodalError::console)
    }
}

/// Result lines for a query; a failing component in a batch becomes an error line.
fn render_query(analysis: &DcAnalysis, query: &Query, painter: Painter, precision: usize) -> Result<Vec<String>> {
    let line = |symbol: char, name: &str, value: &Scalar, unit: &str| {
        painter.result(&format::quantity_line(symbol, name, value, unit, precision))
    };

    let lines = match (query.quantity, &query.target) {
        (Quantity::Voltage, Target::All) => analysis
            .solution()
            .iter()
            .map(|(node, value)| line('V', node, value, "VOLTS"))
            .collect(),
        (Quantity::Voltage, Target::Name(name)) => {
            let value = node_or_component_voltage(analysis, name)?;
            vec![line('V', name, &value, "VOLTS")]
        }
        (Quantity::Current, Target::All) => analysis
            .currents()
            .into_iter()
            .map(|(id, current)| match current {
                Ok(value) => line('I', &id, &value, "AMPERES"),
                Err(err) => painter.error(&format!("ERROR: {err}")),
            })
            .collect(),
        (Quantity::Current, Target::Name(name)) => {
            let value = analysis.current_through(name)?;
            vec![line('I', name, &value, "AMPERES")]
        }
    };
    Ok(lines)
}

/// Node voltage if `name` is a node, otherwise the voltage across a component.
fn node_or_component_voltage(analysis: &DcAnalysis, name: &str) -> Result<Scalar> {
    match analysis.voltage(name) {
        Err(NodalError::UnknownNode { node }) => {
            match analysis.voltage_across(name) {
                Err(NodalError::UnknownComponent { .. }) => Err(NodalError::UnknownNode { node }),
                other => other,
            }
        }
        other => other,
    }
}
