use std::fmt::{Display, Formatter};

/// A configured program template split into the executable and its fixed
/// argument prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAndArgs {
    pub program: String,
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    Empty,
    MissingProgram(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "program template is empty"),
            Self::MissingProgram(expression) => {
                write!(f, "could not parse command and args from '{expression}'")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

pub fn parse(expression: &str) -> Result<ProgramAndArgs, TemplateError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(TemplateError::Empty);
    }

    if let Some(rest) = trimmed.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            let program = rest[..end].trim();
            if program.is_empty() {
                return Err(TemplateError::MissingProgram(trimmed.to_string()));
            }
            return Ok(ProgramAndArgs {
                program: program.to_string(),
                args: rest[end + 1..].trim().to_string(),
            });
        }
    }

    let (program, args) = match trimmed.split_once(' ') {
        Some((program, args)) => (program.trim(), args.trim()),
        None => (trimmed, ""),
    };

    // An unterminated quote would otherwise leak into the program token.
    if program.is_empty() || program.starts_with('"') {
        return Err(TemplateError::MissingProgram(trimmed.to_string()));
    }

    Ok(ProgramAndArgs {
        program: program.to_string(),
        args: args.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse, ProgramAndArgs, TemplateError};

    fn pa(program: &str, args: &str) -> ProgramAndArgs {
        ProgramAndArgs {
            program: program.to_string(),
            args: args.to_string(),
        }
    }

    #[test]
    fn splits_at_first_space() {
        assert_eq!(parse("tool.exe list --all").unwrap(), pa("tool.exe", "list --all"));
    }

    #[test]
    fn bare_program_has_empty_args() {
        assert_eq!(parse("  tool.exe  ").unwrap(), pa("tool.exe", ""));
    }

    #[test]
    fn quoted_program_keeps_inner_spaces() {
        assert_eq!(
            parse(r#""C:\Program Files\Tool\tool.exe"  run  "#).unwrap(),
            pa(r"C:\Program Files\Tool\tool.exe", "run")
        );
    }

    #[test]
    fn quoted_program_without_args() {
        assert_eq!(parse(r#""/opt/my tool/bin""#).unwrap(), pa("/opt/my tool/bin", ""));
    }

    #[test]
    fn collapses_whitespace_at_split_point() {
        assert_eq!(parse("tool    list").unwrap(), pa("tool", "list"));
    }

    #[test]
    fn rejects_empty_expression() {
        assert_eq!(parse("   "), Err(TemplateError::Empty));
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert!(matches!(
            parse(r#""C:\Program Files\tool.exe list"#),
            Err(TemplateError::MissingProgram(_))
        ));
    }

    #[test]
    fn rejects_empty_quoted_program() {
        assert!(matches!(parse(r#""" list"#), Err(TemplateError::MissingProgram(_))));
    }

    #[test]
    fn unquoted_round_trip_preserves_text() {
        for input in ["a b", "tool list --all", "x", "prog  -v  -q"] {
            let parsed = parse(input).unwrap();
            let joined = format!("{} {}", parsed.program, parsed.args);
            let expected = input.trim().split_once(' ').map_or(input.to_string(), |(p, a)| {
                format!("{p} {}", a.trim())
            });
            assert_eq!(joined.trim(), expected.trim());
        }
    }
}
