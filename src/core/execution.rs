//! # Execution Engine
//!
//! Turns a bound [`Execution`] into a plugin call:
//!
//! ```text
//! Unbound -> ConstraintChecked -> ArgumentConverted -> Invoked -> Succeeded | Failed
//! ```
//!
//! The constraint gate runs before anything else, so a command whose facets are
//! missing never reaches conversion or its operation. Conversion is atomic:
//! either every option converts or the operation is not called. Whatever the
//! operation (or plugin resolution) raises is wrapped in
//! [`ShellError::ExecutionFailed`].
use crate::core::{
    arg_parser,
    constraints,
    conversion::{self, Arguments, RawArg, Value},
    environment::{Environment, SystemEnvironment},
    error::{ShellError, ShellResult},
    metadata::CommandMetadata,
    project::Project,
    registry::{CommandRegistry, PluginRegistry},
    resource::Resource,
};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Where an execution is in its single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Bound to a command, nothing checked yet.
    Unbound,
    /// Required facets and scope verified.
    ConstraintChecked,
    /// Every option converted.
    ArgumentConverted,
    /// The operation was called.
    Invoked,
    /// The operation returned normally.
    Succeeded,
    /// A step failed.
    Failed,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One command bound to its raw parameters. Consumed by a single attempt.
#[derive(Debug)]
pub struct Execution {
    command: Option<Arc<CommandMetadata>>,
    parameters: Vec<Option<RawArg>>,
    original_statement: String,
    script_only: bool,
    state: ExecutionState,
}

impl Execution {
    /// An execution of `command` with parameters indexed by declared option.
    pub fn new(
        command: Arc<CommandMetadata>,
        parameters: Vec<Option<RawArg>>,
        original_statement: impl Into<String>,
    ) -> Self {
        Self {
            command: Some(command),
            parameters,
            original_statement: original_statement.into(),
            script_only: false,
            state: ExecutionState::Unbound,
        }
    }

    /// An execution for input that matched no command.
    pub fn unmatched(original_statement: impl Into<String>) -> Self {
        Self {
            command: None,
            parameters: Vec::new(),
            original_statement: original_statement.into(),
            script_only: false,
            state: ExecutionState::Unbound,
        }
    }

    /// Marks the execution as coming from a script rather than a person.
    pub fn script_only(mut self, script_only: bool) -> Self {
        self.script_only = script_only;
        self
    }

    /// The matched command.
    pub fn command(&self) -> Option<&Arc<CommandMetadata>> {
        self.command.as_ref()
    }

    /// The raw parameters, by declared option index.
    pub fn parameters(&self) -> &[Option<RawArg>] {
        &self.parameters
    }

    /// The input the execution was built from.
    pub fn original_statement(&self) -> &str {
        &self.original_statement
    }

    /// The current state.
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    fn advance(&mut self, next: ExecutionState) {
        debug!(
            "'{}': {} -> {}",
            self.original_statement, self.state, next
        );
        self.state = next;
    }
}

/// Text written by a command for the next pipeline stage (or the terminal).
#[derive(Debug, Default)]
pub struct PipeOut {
    buffer: String,
}

impl PipeOut {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends text.
    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Appends a line.
    pub fn println(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    /// The text written so far.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Takes the text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// What an operation sees of the shell.
#[derive(Debug)]
pub struct InvocationContext<'a> {
    project: Option<&'a Project>,
    cursor: &'a Resource,
    out: &'a mut PipeOut,
    environment: &'a dyn Environment,
    script_only: bool,
    next_cursor: Option<Resource>,
}

impl<'a> InvocationContext<'a> {
    /// A context over the given shell state.
    pub fn new(
        project: Option<&'a Project>,
        cursor: &'a Resource,
        out: &'a mut PipeOut,
        environment: &'a dyn Environment,
    ) -> Self {
        Self {
            project,
            cursor,
            out,
            environment,
            script_only: false,
            next_cursor: None,
        }
    }

    /// The open project, if any.
    pub fn project(&self) -> Option<&'a Project> {
        self.project
    }

    /// The open project; an error when none is open.
    pub fn require_project(&self) -> anyhow::Result<&'a Project> {
        self.project
            .ok_or_else(|| anyhow::anyhow!("no project is open"))
    }

    /// The resource the shell is positioned at.
    pub fn cursor(&self) -> &'a Resource {
        self.cursor
    }

    /// The host environment the shell was started with.
    pub fn environment(&self) -> &'a dyn Environment {
        self.environment
    }

    /// The pipe-out channel.
    pub fn out(&mut self) -> &mut PipeOut {
        &mut *self.out
    }

    /// Whether the command runs from a script.
    pub fn is_script_only(&self) -> bool {
        self.script_only
    }

    /// Asks the shell to move its cursor once the command succeeds.
    pub fn change_cursor(&mut self, resource: Resource) {
        self.next_cursor = Some(resource);
    }
}

/// The result of a successful execution.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    /// Where the command asked the cursor to move.
    pub next_cursor: Option<Resource>,
}

/// Resolves, gates, converts and invokes commands.
#[derive(Debug)]
pub struct ExecutionEngine {
    commands: CommandRegistry,
    plugins: PluginRegistry,
    environment: Arc<dyn Environment>,
}

impl ExecutionEngine {
    /// An engine over the given registries, reading the real environment.
    pub fn new(commands: CommandRegistry, plugins: PluginRegistry) -> Self {
        Self {
            commands,
            plugins,
            environment: Arc::new(SystemEnvironment::new()),
        }
    }

    /// Replaces the environment handed to operations.
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// The command registry.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Resolves `tokens` to a command and binds the rest as its parameters.
    ///
    /// Input that names no command yields an unmatched execution; binding
    /// failures are returned directly.
    pub fn prepare(&self, tokens: &[String], piped: Option<&str>) -> ShellResult<Execution> {
        let statement = tokens.join(" ");
        let Some((command, consumed)) = self.commands.resolve(tokens) else {
            return Ok(Execution::unmatched(statement));
        };
        let rest = tokens.get(consumed..).unwrap_or_default();
        let parameters = arg_parser::bind(&command, rest, piped)?;
        Ok(Execution::new(command, parameters, statement))
    }

    /// Runs `execution` once.
    pub fn execute(
        &self,
        mut execution: Execution,
        project: Option<&Project>,
        cursor: &Resource,
        out: &mut PipeOut,
    ) -> ShellResult<ExecutionOutcome> {
        let Some(command) = execution.command.clone() else {
            return Err(ShellError::NoSuchCommand {
                statement: execution.original_statement,
            });
        };

        let result = self.run(&mut execution, &command, project, cursor, out);
        match &result {
            Ok(_) => execution.advance(ExecutionState::Succeeded),
            Err(e) => {
                debug!("'{}' failed: {}", execution.original_statement, e);
                execution.advance(ExecutionState::Failed);
            }
        }
        result
    }

    fn run(
        &self,
        execution: &mut Execution,
        command: &CommandMetadata,
        project: Option<&Project>,
        cursor: &Resource,
        out: &mut PipeOut,
    ) -> ShellResult<ExecutionOutcome> {
        constraints::verify_available(project, command)?;
        constraints::verify_scope(command, cursor)?;
        execution.advance(ExecutionState::ConstraintChecked);

        let values = command
            .options()
            .iter()
            .map(|option| {
                let raw = execution
                    .parameters
                    .get(option.index())
                    .and_then(Option::as_ref);
                conversion::convert(option, raw)
            })
            .collect::<ShellResult<Vec<Value>>>()?;
        let arguments = Arguments::new(values);
        execution.advance(ExecutionState::ArgumentConverted);

        let instance = self
            .plugins
            .resolve(&command.plugin_type())
            .map_err(|e| ShellError::execution(command.qualified_name(), e))?;

        let mut ctx = InvocationContext::new(project, cursor, out, self.environment.as_ref());
        ctx.script_only = execution.script_only;
        execution.advance(ExecutionState::Invoked);
        (command.operation())(instance.as_ref(), &arguments, &mut ctx)
            .map_err(|e| ShellError::execution(command.qualified_name(), e))?;

        Ok(ExecutionOutcome {
            next_cursor: ctx.next_cursor,
        })
    }
}
