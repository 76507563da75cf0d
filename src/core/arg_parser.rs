// src/core/arg_parser.rs

use crate::core::{
    commons::wrap_value,
    conversion::RawArg,
    error::{ShellError, ShellResult},
    metadata::{CommandMetadata, OptionMetadata},
};
use log::debug;

/// A token given on the command line and whether an option claimed it.
#[derive(Debug, Clone, Copy)]
struct CliArgument<'a> {
    value: &'a str,
    consumed: bool,
}

/// Binds command-line tokens to a command's options.
///
/// Named options are matched by long (`--name`, `--name=value`) or short
/// (`-n value`) name. Switches bind `true` without consuming a value. The rest
/// are positional tokens, handed to the ordered options by effective index; a
/// variadic option takes every remaining positional. `--` ends option parsing.
#[derive(Debug)]
pub struct ArgBinder<'a> {
    command: &'a CommandMetadata,
    positional: Vec<CliArgument<'a>>,
    params: Vec<Option<RawArg>>,
}

impl<'a> ArgBinder<'a> {
    /// Classifies `tokens` for `command`. Named options are bound immediately.
    pub fn new(command: &'a CommandMetadata, tokens: &'a [String]) -> ShellResult<Self> {
        let mut binder = Self {
            command,
            positional: Vec::new(),
            params: vec![None; command.options().len()],
        };

        let mut tokens_iter = tokens.iter().map(String::as_str);
        let mut options_done = false;
        while let Some(token) = tokens_iter.next() {
            if options_done {
                binder.push_positional(token);
                continue;
            }
            if token == "--" {
                options_done = true;
                continue;
            }

            let (key, inline) = match split_option(token) {
                Some(parts) => parts,
                None => {
                    binder.push_positional(token);
                    continue;
                }
            };
            let option = command
                .named_option(key)
                .ok_or_else(|| binder.unexpected(&[token]))?;

            let raw = if option.is_flag_only() || option.is_boolean() {
                RawArg::Text(inline.unwrap_or("true").to_string())
            } else {
                match inline.or_else(|| tokens_iter.next()) {
                    Some(value) => RawArg::Text(value.to_string()),
                    None => return Err(binder.missing(option)),
                }
            };
            binder.assign(option, raw, token)?;
        }

        Ok(binder)
    }

    /// Binds the positional tokens and the piped value, then checks that
    /// nothing is left over and nothing required is missing.
    pub fn finish(mut self, piped: Option<&str>) -> ShellResult<Vec<Option<RawArg>>> {
        let command = self.command;
        let mut remaining = self.positional.iter_mut();
        for option in command.ordered_options() {
            if option.is_varargs() {
                let rest: Vec<String> = remaining
                    .by_ref()
                    .map(|arg| {
                        arg.consumed = true;
                        arg.value.to_string()
                    })
                    .collect();
                if !rest.is_empty() {
                    set_slot(&mut self.params, option, RawArg::List(rest));
                }
            } else if let Some(arg) = remaining.next() {
                arg.consumed = true;
                set_slot(&mut self.params, option, RawArg::Text(arg.value.to_string()));
            }
        }

        let leftover: Vec<&str> = self
            .positional
            .iter()
            .filter(|arg| !arg.consumed)
            .map(|arg| arg.value)
            .collect();
        if !leftover.is_empty() {
            return Err(self.unexpected(&leftover));
        }

        if let Some(value) = piped {
            match command.pipe_in_option() {
                Some(option) => set_slot(&mut self.params, option, RawArg::Text(value.to_string())),
                None => debug!(
                    "'{}' takes no piped input; discarding it.",
                    command.qualified_name()
                ),
            }
        }

        for option in command.options() {
            let bound = self
                .params
                .get(option.index())
                .is_some_and(Option::is_some);
            if option.is_required() && !bound && !option.has_default_value() && !option.is_pipe_out() {
                return Err(self.missing(option));
            }
        }

        Ok(self.params)
    }

    fn push_positional(&mut self, value: &'a str) {
        self.positional.push(CliArgument {
            value,
            consumed: false,
        });
    }

    fn assign(&mut self, option: &OptionMetadata, raw: RawArg, token: &str) -> ShellResult<()> {
        let already = self
            .params
            .get(option.index())
            .is_some_and(Option::is_some);
        if already {
            return Err(ShellError::UnexpectedArguments {
                command: self.command.qualified_name(),
                arguments: format!("{} was given more than once", wrap_value(token)),
            });
        }
        set_slot(&mut self.params, option, raw);
        Ok(())
    }

    fn unexpected(&self, tokens: &[&str]) -> ShellError {
        let quoted: Vec<String> = tokens.iter().map(|t| wrap_value(t)).collect();
        ShellError::UnexpectedArguments {
            command: self.command.qualified_name(),
            arguments: quoted.join(", "),
        }
    }

    fn missing(&self, option: &OptionMetadata) -> ShellError {
        ShellError::MissingArgument {
            command: self.command.qualified_name(),
            option: option.option_descriptor(),
        }
    }
}

/// Binds `tokens` (and an optional piped value) to `command` in one call.
pub fn bind(
    command: &CommandMetadata,
    tokens: &[String],
    piped: Option<&str>,
) -> ShellResult<Vec<Option<RawArg>>> {
    ArgBinder::new(command, tokens)?.finish(piped)
}

fn set_slot(params: &mut [Option<RawArg>], option: &OptionMetadata, raw: RawArg) {
    if let Some(slot) = params.get_mut(option.index()) {
        *slot = Some(raw);
    }
}

/// Splits `--name=value`, `--name` and `-n` into a key and an inline value.
/// Returns `None` for positional tokens, including negative numbers.
fn split_option(token: &str) -> Option<(&str, Option<&str>)> {
    if let Some(long) = token.strip_prefix("--") {
        if long.is_empty() {
            return None;
        }
        return Some(match long.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (long, None),
        });
    }
    let short = token.strip_prefix('-')?;
    if short.is_empty() || token.parse::<f64>().is_ok() {
        return None;
    }
    Some((short, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversion::Arguments;
    use crate::core::execution::InvocationContext;
    use crate::core::metadata::{CommandBuilder, PluginBuilder, ValueType};

    #[derive(Debug)]
    struct Dummy;

    fn noop(_: &Dummy, _: &Arguments, _: &mut InvocationContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn text(s: &str) -> Option<RawArg> {
        Some(RawArg::Text(s.to_string()))
    }

    /// `field <name> <type> [--length n] [--nullable] [-q]` plus a piped input.
    fn field_command() -> std::sync::Arc<CommandMetadata> {
        PluginBuilder::<Dummy>::new("field")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::positional(ValueType::String).required())
                    .with_option(OptionMetadata::named("length", ValueType::Integer).with_short('l'))
                    .with_option(OptionMetadata::positional(ValueType::String).with_default("String"))
                    .with_option(OptionMetadata::flag("nullable"))
                    .with_option(OptionMetadata::pipe_in(ValueType::String))
                    .run(noop),
            )
            .build()
            .unwrap()
            .default_command()
            .cloned()
            .unwrap()
    }

    fn echo_command() -> std::sync::Arc<CommandMetadata> {
        PluginBuilder::<Dummy>::new("echo")
            .with_command(
                CommandBuilder::default_command()
                    .with_option(OptionMetadata::flag("upper").with_short('u'))
                    .with_option(OptionMetadata::positional(ValueType::Sequence(Box::new(
                        ValueType::String,
                    ))))
                    .run(noop),
            )
            .build()
            .unwrap()
            .default_command()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_positionals_bind_by_effective_index() {
        let command = field_command();
        let params = bind(&command, &tokens("name Long"), None).unwrap();
        assert_eq!(params, vec![text("name"), None, text("Long"), None, None]);
    }

    #[test]
    fn test_named_forms_and_flags() {
        let command = field_command();
        let params = bind(&command, &tokens("--nullable id --length=10"), None).unwrap();
        assert_eq!(params, vec![text("id"), text("10"), None, text("true"), None]);

        let short = bind(&command, &tokens("id -l 5"), None).unwrap();
        assert_eq!(short.get(1).cloned().flatten(), text("5"));
    }

    #[test]
    fn test_piped_value_binds_pipe_in_option() {
        let command = field_command();
        let params = bind(&command, &tokens("id"), Some("from upstream")).unwrap();
        assert_eq!(params.get(4).cloned().flatten(), text("from upstream"));
    }

    #[test]
    fn test_missing_required_positional() {
        let command = field_command();
        let result = bind(&command, &[], None);
        assert!(matches!(result, Err(ShellError::MissingArgument { .. })));
    }

    #[test]
    fn test_missing_value_for_named_option() {
        let command = field_command();
        let result = bind(&command, &tokens("id --length"), None);
        assert!(matches!(result, Err(ShellError::MissingArgument { .. })));
    }

    #[test]
    fn test_unknown_and_surplus_tokens_are_rejected() {
        let command = field_command();
        assert!(matches!(
            bind(&command, &tokens("id --bogus"), None),
            Err(ShellError::UnexpectedArguments { .. })
        ));
        assert!(matches!(
            bind(&command, &tokens("id String extra"), None),
            Err(ShellError::UnexpectedArguments { .. })
        ));
    }

    #[test]
    fn test_duplicate_option_is_a_conflict() {
        let command = field_command();
        let result = bind(&command, &tokens("id --length 1 -l 2"), None);
        assert!(matches!(result, Err(ShellError::UnexpectedArguments { .. })));
    }

    #[test]
    fn test_varargs_consume_the_rest() {
        let command = echo_command();
        let params = bind(&command, &tokens("-u hello big world"), None).unwrap();
        assert_eq!(
            params,
            vec![
                text("true"),
                Some(RawArg::List(vec![
                    "hello".to_string(),
                    "big".to_string(),
                    "world".to_string()
                ]))
            ]
        );
    }

    #[test]
    fn test_double_dash_ends_options() {
        let command = echo_command();
        let params = bind(&command, &tokens("-- -u --not-a-flag -3"), None).unwrap();
        assert_eq!(params.first().cloned().flatten(), None);
        assert_eq!(
            params.get(1).cloned().flatten(),
            Some(RawArg::List(vec![
                "-u".to_string(),
                "--not-a-flag".to_string(),
                "-3".to_string()
            ]))
        );
    }

    #[test]
    fn test_negative_numbers_are_positional() {
        assert_eq!(split_option("-3"), None);
        assert_eq!(split_option("-2.5"), None);
        assert_eq!(split_option("-x"), Some(("x", None)));
        assert_eq!(split_option("--k=v"), Some(("k", Some("v"))));
        assert_eq!(split_option("plain"), None);
    }
}
