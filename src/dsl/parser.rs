//! Line parser for console commands and netlist statements.

use super::ast::*;
use super::value::require_value;
use crate::circuit::{normalize_name, ComponentKind};
use crate::error::{NodalError, Result};

/// Parse one console line.
///
/// Keywords are case-insensitive. Anything that is not a command is read as
/// a statement (branch line or value assignment).
pub fn parse_command(text: &str, line: usize) -> Result<Command> {
    let text = text.trim();
    if text.is_empty() || text == "=" {
        return Ok(Command::Empty);
    }

    match text.to_uppercase().as_str() {
        "HELP" => return Ok(Command::Help),
        "NEW" => return Ok(Command::New),
        "CLEAR" | "CLS" => return Ok(Command::Clear),
        "END" | "EXIT" => return Ok(Command::Exit),
        _ => {}
    }

    let (keyword, rest) = match text.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword.to_uppercase(), rest.trim()),
        None => (text.to_uppercase(), ""),
    };

    match keyword.as_str() {
        "RETURN" => parse_query(rest, line).map(Command::Return),
        "IMPORT" => {
            if rest.is_empty() {
                return Err(NodalError::parse(line, "IMPORT needs a file name"));
            }
            Ok(Command::Import(rest.to_string()))
        }
        "PRINT" => match rest.to_uppercase().as_str() {
            "BRANCHES" | "BRANCH" | "BRANCHS" => Ok(Command::Print(PrintTarget::Branches)),
            "COMPONENTS" | "COMPONENT" | "COMPS" | "COMP" => Ok(Command::Print(PrintTarget::Components)),
            _ => Err(NodalError::parse(line, "PRINT expects BRANCHES or COMPONENTS")),
        },
        "EDIT" => parse_edit(rest, line),
        _ => parse_statement(text, line).map(Command::Statement),
    }
}

/// Parse a netlist statement: `START COMP[=VALUE] END` or `COMP=VALUE`.
pub fn parse_statement(text: &str, line: usize) -> Result<Statement> {
    let text = text.trim();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    match tokens.as_slice() {
        [single] if single.contains('=') => parse_assignment(single, line).map(Statement::Assign),
        [start, component, end] => {
            let (id, value) = match component.split_once('=') {
                Some((id, value)) => (id, Some(parse_number(value, line)?)),
                None => (*component, None),
            };
            Ok(Statement::Branch(BranchDef {
                start: parse_node(start, line)?,
                id: parse_component(id, line)?,
                end: parse_node(end, line)?,
                value,
            }))
        }
        _ => Err(NodalError::parse(
            line,
            format!("'{text}' is not a command or branch (START COMP[=VALUE] END)"),
        )),
    }
}

fn parse_assignment(text: &str, line: usize) -> Result<Assignment> {
    let (id, value) = text
        .split_once('=')
        .ok_or_else(|| NodalError::parse(line, format!("expected COMP=VALUE, got '{text}'")))?;
    Ok(Assignment {
        id: parse_component(id, line)?,
        value: parse_number(value, line)?,
    })
}

fn parse_edit(rest: &str, line: usize) -> Result<Command> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(word), Some(number), None) if word.eq_ignore_ascii_case("BRANCH") => number
            .parse::<usize>()
            .map(Command::EditBranch)
            .map_err(|_| NodalError::parse(line, format!("'{number}' is not a branch number"))),
        (Some(assignment), None, None) if assignment.contains('=') => {
            parse_assignment(assignment, line).map(Command::Edit)
        }
        _ => Err(NodalError::parse(line, "EDIT expects COMP=VALUE or BRANCH <number>")),
    }
}

/// `V(name)`, `I(name)` or either with `ALL`; spaces are ignored.
fn parse_query(rest: &str, line: usize) -> Result<Query> {
    let compact: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.to_uppercase();

    let malformed = || NodalError::parse(line, "RETURN expects V(<node|component|ALL>) or I(<component|ALL>)");
    let inner = compact
        .strip_suffix(')')
        .and_then(|s| s.split_once('('))
        .ok_or_else(malformed)?;

    let quantity = match inner.0 {
        "V" => Quantity::Voltage,
        "I" => Quantity::Current,
        _ => return Err(malformed()),
    };
    let target = match inner.1 {
        "" => return Err(malformed()),
        "ALL" => Target::All,
        name => Target::Name(name.to_string()),
    };

    Ok(Query { quantity, target })
}

fn parse_node(text: &str, line: usize) -> Result<String> {
    let valid = !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(NodalError::parse(line, format!("'{text}' is not a valid node name")));
    }
    Ok(normalize_name(text))
}

fn parse_component(text: &str, line: usize) -> Result<String> {
    let id = normalize_name(text);
    if ComponentKind::from_id(&id).is_none() || !id.chars().all(char::is_alphanumeric) {
        return Err(NodalError::parse(
            line,
            NodalError::invalid_component(&id, "expected R, V or I followed by a number").to_string(),
        ));
    }
    Ok(id)
}

fn parse_number(text: &str, line: usize) -> Result<crate::circuit::Scalar> {
    require_value(text).map_err(|e| NodalError::parse(line, e.to_string()))
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;
    use crate::circuit::Scalar;

    fn int(v: i64) -> Scalar {
        Scalar::from_integer(BigInt::from(v))
    }

    #[test]
    fn test_parse_branch_with_value() {
        let cmd = parse_command("a R1=10k b", 1).unwrap();
        assert_eq!(
            cmd,
            Command::Statement(Statement::Branch(BranchDef {
                start: "A".to_string(),
                id: "R1".to_string(),
                end: "B".to_string(),
                value: Some(int(10_000)),
            }))
        );
    }

    #[test]
    fn test_parse_branch_without_value() {
        let stmt = parse_statement("A  v2   gnd", 1).unwrap();
        match stmt {
            Statement::Branch(def) => {
                assert_eq!(def.id, "V2");
                assert_eq!(def.end, "GND");
                assert!(def.value.is_none());
            }
            other => panic!("expected branch, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_command("r1=4.7k", 1).unwrap(),
            Command::Statement(Statement::Assign(Assignment {
                id: "R1".to_string(),
                value: int(4_700),
            }))
        );
        // Mega and milli keep their case
        match parse_statement("R2=1M", 1).unwrap() {
            Statement::Assign(a) => assert_eq!(a.value, int(1_000_000)),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("help", 1).unwrap(), Command::Help);
        assert_eq!(parse_command("  New ", 1).unwrap(), Command::New);
        assert_eq!(parse_command("cls", 1).unwrap(), Command::Clear);
        assert_eq!(parse_command("EXIT", 1).unwrap(), Command::Exit);
        assert_eq!(parse_command("", 1).unwrap(), Command::Empty);
        assert_eq!(
            parse_command("print comps", 1).unwrap(),
            Command::Print(PrintTarget::Components)
        );
        assert_eq!(
            parse_command("PRINT BRANCHS", 1).unwrap(),
            Command::Print(PrintTarget::Branches)
        );
        assert_eq!(
            parse_command("IMPORT circuits/Divider.txt", 1).unwrap(),
            Command::Import("circuits/Divider.txt".to_string())
        );
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(parse_command("edit branch 2", 1).unwrap(), Command::EditBranch(2));
        assert_eq!(
            parse_command("EDIT R1=2k", 1).unwrap(),
            Command::Edit(Assignment {
                id: "R1".to_string(),
                value: int(2_000),
            })
        );
        assert!(parse_command("EDIT BRANCH two", 1).is_err());
        assert!(parse_command("EDIT R1", 1).is_err());
    }

    #[test]
    fn test_parse_queries() {
        assert_eq!(
            parse_command("return v(a)", 1).unwrap(),
            Command::Return(Query {
                quantity: Quantity::Voltage,
                target: Target::Name("A".to_string()),
            })
        );
        assert_eq!(
            parse_command("RETURN I (ALL)", 1).unwrap(),
            Command::Return(Query {
                quantity: Quantity::Current,
                target: Target::All,
            })
        );
        assert!(parse_command("RETURN X(A)", 1).is_err());
        assert!(parse_command("RETURN V()", 1).is_err());
        assert!(parse_command("RETURN V(A", 1).is_err());
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse_statement("A C1=1u B", 7).unwrap_err();
        assert!(matches!(err, NodalError::ParseError { line: 7, .. }));

        let err = parse_statement("A R1=ten B", 3).unwrap_err();
        assert!(err.to_string().contains("ten"));

        assert!(parse_statement("A R1", 1).is_err());
        assert!(parse_statement("A= R1 B", 1).is_err());
    }
}
