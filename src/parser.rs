//! This module provides the parser for textual machine descriptions, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns its parse tree into a `Program`.

use crate::{
    analyzer::analyze,
    program::Program,
    table::{TableEntry, TransitionTable},
    tape::TapePolicy,
    types::{Direction, MachineError, DEFAULT_BLANK_SYMBOL, MAX_PROGRAM_SIZE},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the machine description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses the given input string into a `Program`.
///
/// The first state declared under `rules:` becomes the start state. States declared
/// without transitions are treated as halt states. The parsed program is validated with
/// [`analyze`] before being returned.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(MachineError::ParseError)` if there are any syntax errors.
/// * `Err(MachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, MachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(MachineError::ValidationError(format!(
            "Program is {} bytes, the limit is {}",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    let root = MachineParser::parse(Rule::program, input.trim())
        .map_err(|e| MachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| MachineError::ValidationError("Empty program".to_string()))?;

    let program = parse_program(root)?;

    analyze(&program)?;

    Ok(program)
}

/// Parsed rule blocks: the table entries, the declared states in order, and the states
/// declared without transitions.
struct ParsedRules {
    entries: Vec<TableEntry<char>>,
    states: Vec<String>,
    terminal: Vec<String>,
}

fn parse_program(pair: Pair<Rule>) -> Result<Program, MachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<char> = None;
    let mut tape: Option<Vec<char>> = None;
    let mut length: Option<usize> = None;
    let mut head: Option<isize> = None;
    let mut steps: Option<usize> = None;
    let mut policy: Option<TapePolicy> = None;
    let mut halt: Vec<String> = Vec::new();
    let mut rules: Option<ParsedRules> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_str(p).trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(parse_inner_str(p))),
            Rule::tape => tape = Some(parse_symbols(p)),
            Rule::length => length = Some(parse_number(p)?),
            Rule::head => head = Some(parse_number(p)?),
            Rule::steps => steps = Some(parse_number(p)?),
            Rule::policy => policy = Some(parse_policy(p)),
            Rule::halt => halt = p.into_inner().map(|s| s.as_str().to_string()).collect(),
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {}
        }
    }

    let name = check_required_rule(name, vec!["name"])?;
    let rules = check_required_rule(rules, vec!["rules"])?;
    if tape.is_none() && length.is_none() {
        return Err(MachineError::ValidationError(format!(
            "Missing {} section",
            format_rules(vec!["tape", "length"])
        )));
    }

    let initial_state = rules.states.first().cloned().ok_or_else(|| {
        MachineError::ValidationError("The 'rules' section declares no states".to_string())
    })?;

    for state in rules.terminal {
        if !halt.contains(&state) {
            halt.push(state);
        }
    }

    let tape = tape.unwrap_or_default();
    let length = length.unwrap_or(0).max(tape.len());

    Ok(Program {
        name,
        initial_state,
        blank: blank.unwrap_or(DEFAULT_BLANK_SYMBOL),
        tape,
        length,
        head: head.unwrap_or(0),
        policy: policy.unwrap_or_default(),
        steps,
        halt,
        table: TransitionTable::new(rules.entries)?,
    })
}

/// Parses the `rules:` section.
///
/// Rejects a state declared twice and a `(state, symbol)` pair mapped twice.
fn parse_rules(pair: Pair<Rule>) -> Result<ParsedRules, MachineError> {
    let mut parsed = ParsedRules {
        entries: Vec::new(),
        states: Vec::new(),
        terminal: Vec::new(),
    };

    // Rule: rules > [state_block] > state, [transition] > symbol, action
    for block in pair.into_inner() {
        let span = block.as_span();
        let mut inner = block.into_inner();
        let state = match inner.next() {
            Some(p) => p.as_str().to_string(),
            None => continue,
        };

        if parsed.states.contains(&state) {
            return Err(parse_error(&format!("Duplicate state block: {state}"), span));
        }

        let mut reads = HashSet::new();
        for transition in inner {
            let span = transition.as_span();
            let entry = parse_transition(&state, transition)?;
            if !reads.insert(entry.read) {
                return Err(parse_error(
                    &format!(
                        "Duplicate transition for symbol '{}' in state {state}",
                        entry.read
                    ),
                    span,
                ));
            }
            parsed.entries.push(entry);
        }

        if reads.is_empty() {
            parsed.terminal.push(state.clone());
        }
        parsed.states.push(state);
    }

    Ok(parsed)
}

/// Parses one `read -> write, direction, next` line of a state block.
///
/// If `write` is omitted the transition writes back the symbol it read.
fn parse_transition(state: &str, pair: Pair<Rule>) -> Result<TableEntry<char>, MachineError> {
    let mut pairs = pair.into_inner();
    let read = parse_symbol(next_str(&mut pairs, "symbol")?);
    let mut action = pairs
        .next()
        .ok_or_else(|| MachineError::ValidationError("Missing action".to_string()))?
        .into_inner()
        .peekable();

    let write = match action.peek().map(|p| p.as_rule()) {
        Some(Rule::symbol) => parse_symbol(next_str(&mut action, "symbol")?),
        _ => read,
    };

    let direction = match action.next() {
        Some(p) => parse_direction(p)?,
        None => return Err(MachineError::ValidationError("Missing direction".to_string())),
    };
    let next_state = next_str(&mut action, "next state")?;

    Ok(TableEntry::new(read, state, write, direction, next_state))
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a single direction from a `Pair<Rule::direction>`.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, MachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "L" => Ok(Direction::Left),
        "R" => Ok(Direction::Right),
        "S" => Ok(Direction::Stay),
        other => Err(parse_error(&format!("Unsupported direction: {other}"), span)),
    }
}

fn parse_policy(pair: Pair<Rule>) -> TapePolicy {
    match parse_inner_str(pair) {
        "fixed" => TapePolicy::Fixed,
        _ => TapePolicy::Grow,
    }
}

fn parse_number<T: std::str::FromStr>(pair: Pair<Rule>) -> Result<T, MachineError> {
    let span = pair.as_span();
    let text = parse_inner_str(pair);
    text.parse::<T>()
        .map_err(|_| parse_error(&format!("Number out of range: {text}"), span))
}

/// Parses the comma-separated symbols of a `tape:` section.
fn parse_symbols(pair: Pair<Rule>) -> Vec<char> {
    // Rule: tape > symbols > [symbol]
    pair.into_inner()
        .flat_map(|symbols| symbols.into_inner())
        .map(|symbol| parse_symbol(symbol.as_str()))
        .collect()
}

/// Parses a single character symbol, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> char {
    let trimmed = if input.len() > 1 {
        input.trim_matches('\'')
    } else {
        input
    };
    trimmed.chars().next().unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// Extracts the text of the first inner pair.
fn parse_inner_str(pair: Pair<Rule>) -> &str {
    pair.into_inner().next().map(|p| p.as_str()).unwrap_or("")
}

fn next_str<'i>(
    pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    what: &str,
) -> Result<&'i str, MachineError> {
    pairs
        .next()
        .map(|p| p.as_str())
        .ok_or_else(|| MachineError::ValidationError(format!("Missing {what}")))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), MachineError> {
    if !matches!(
        rule,
        Rule::name
            | Rule::blank
            | Rule::tape
            | Rule::length
            | Rule::head
            | Rule::steps
            | Rule::policy
            | Rule::halt
            | Rule::rules
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, names: Vec<&str>) -> Result<T, MachineError> {
    value.ok_or_else(|| {
        MachineError::ValidationError(format!("Missing {} section", format_rules(names)))
    })
}

/// Formats a list of section names into a human-readable string for error messages.
fn format_rules(names: Vec<&str>) -> String {
    names
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transition;

    #[test]
    fn test_parse_simple_program() {
        let input = r#"
name: Simple Test
tape: a
rules:
  start:
    a -> b, R, halt
  halt:
"#;

        let program = parse(input).unwrap();
        assert_eq!(program.name, "Simple Test");
        assert_eq!(program.tape, vec!['a']);
        assert_eq!(program.length, 1);
        assert_eq!(program.initial_state, "start");
        assert_eq!(program.halt, vec!["halt".to_string()]);
        assert_eq!(
            program.table.lookup(&'a', "start").unwrap(),
            &Transition::new('b', Direction::Right, "halt")
        );
    }

    #[test]
    fn test_parse_all_sections() {
        let input = r#"
// leading comment
name: Full header   // trailing comment
blank: '_'
tape: x, ','
length: 8
head: 1
steps: 3
policy: fixed
halt: done
rules:
  q0:
    _ -> x, L, q0   // loops
    ',' -> ':', R, q0
    x -> S, done
"#;

        let program = parse(input).unwrap();
        assert_eq!(program.name, "Full header");
        assert_eq!(program.blank, '_');
        assert_eq!(program.tape, vec!['x', ',']);
        assert_eq!(program.length, 8);
        assert_eq!(program.head, 1);
        assert_eq!(program.steps, Some(3));
        assert_eq!(program.policy, TapePolicy::Fixed);
        assert_eq!(program.halt, vec!["done".to_string()]);
        assert_eq!(program.table.lookup(&',', "q0").unwrap().write, ':');
        assert_eq!(
            program.table.lookup(&'x', "q0").unwrap(),
            &Transition::new('x', Direction::Stay, "done")
        );
    }

    #[test]
    fn test_parse_bare_punctuation_symbols() {
        let input = r#"
name: Punctuation
length: 4
rules:
  s1:
    # -> (, R, s2
  s2:
    # -> +, L, s1
    ( -> ), R, s2
    + -> -, R, s2
"#;

        let program = parse(input).unwrap();
        assert_eq!(program.blank, '#');
        assert_eq!(program.tape, Vec::<char>::new());
        assert_eq!(program.length, 4);
        assert_eq!(program.table.lookup(&'#', "s1").unwrap().write, '(');
        assert_eq!(program.table.lookup(&'(', "s2").unwrap().write, ')');
        assert_eq!(program.table.lookup(&'+', "s2").unwrap().write, '-');
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
tape: a
rules:
  start:
    a -> b, R, start
"#;
        let result = parse(input);
        let error = result.unwrap_err();
        assert!(matches!(error, MachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
tape: a
rules:
  start:
    a -> b, R, start
"#;
        let result = parse(input);
        assert_eq!(
            result,
            Err(MachineError::ValidationError(
                "Missing 'name' section".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_missing_tape() {
        let input = r#"
name: No Tape
rules:
  start:
    a -> b, R, start
"#;
        let result = parse(input);
        assert_eq!(
            result,
            Err(MachineError::ValidationError(
                "Missing 'tape' or 'length' section".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_missing_rules() {
        let input = r#"
name: No Rules
tape: a
"#;
        assert!(matches!(parse(input), Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_empty_rules() {
        let input = "name: Empty\ntape: a\nrules:\n";
        assert!(matches!(
            parse(input),
            Err(MachineError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_duplicate_transition_rule() {
        let input = r#"
name: Duplicate
tape: a
rules:
  start:
    a -> b, R, start
    a -> c, L, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, MachineError::ParseError(_)));
        assert!(error.to_string().contains("Duplicate transition"));
    }

    #[test]
    fn test_parse_duplicate_state_block() {
        let input = r#"
name: Duplicate
tape: a
rules:
  start:
    a -> b, R, start
  start:
    b -> a, R, start
"#;
        let error = parse(input).unwrap_err();
        assert!(error.to_string().contains("Duplicate state block"));
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let input = r#"
name: Bad Direction
tape: a
rules:
  start:
    a -> b, X, start
"#;
        assert!(matches!(parse(input), Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_omitted_write_symbol() {
        let input = r#"
name: Scan
tape: a
rules:
  start:
    a -> R, start
    # -> L, done
  done:
"#;
        let program = parse(input).unwrap();
        assert_eq!(
            program.table.lookup(&'a', "start").unwrap(),
            &Transition::new('a', Direction::Right, "start")
        );
        assert_eq!(program.table.lookup(&'#', "start").unwrap().write, '#');
    }

    #[test]
    fn test_parse_rejects_oversized_input() {
        let input = "x".repeat(MAX_PROGRAM_SIZE + 1);
        assert!(matches!(
            parse(&input),
            Err(MachineError::ValidationError(_))
        ));
    }
}
