//! `gitGraph` parser.

use merval_core::ast::{
    Diagram, DiagramKind, Direction, GitGraphDiagram,
    gitgraph::{GitCommand, GitCommandKind},
};
use winnow::{
    Parser,
    ascii::space0,
    combinator::{alt, delimited, repeat, separated_pair},
    error::ModalResult,
    token::{take_till, take_while},
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, strip_keyword, strip_keyword_colon, unquote},
    parser::{DiagramParser, Rule, diagram_header, run_cascade, unexpected_modifier},
};

const RULES: &[Rule<GitGraphState>] = &[
    Rule {
        name: "commit",
        handler: GitGraphState::commit,
    },
    Rule {
        name: "branch",
        handler: GitGraphState::branch,
    },
    Rule {
        name: "checkout",
        handler: GitGraphState::checkout,
    },
    Rule {
        name: "merge",
        handler: GitGraphState::merge,
    },
    Rule {
        name: "cherry-pick",
        handler: GitGraphState::cherry_pick,
    },
];

fn option_value(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        take_till(1.., char::is_whitespace),
    ))
    .map(str::to_string)
    .parse_next(input)
}

fn option<'s>(input: &mut &'s str) -> ModalResult<(&'s str, String)> {
    delimited(
        space0,
        separated_pair(
            take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
            (space0, ':', space0),
            option_value,
        ),
        space0,
    )
    .parse_next(input)
}

/// Parse `key: value` options, rejecting keys outside `allowed`.
fn parse_options(
    line: &SourceLine<'_>,
    text: &str,
    allowed: &[&str],
) -> Result<Vec<(String, String)>> {
    let options: Vec<(&str, String)> = repeat(0.., option).parse(text).map_err(|_| {
        line.syntax_error(
            ErrorCode::E101,
            format!("malformed options `{text}`, expected `key: value` pairs"),
        )
    })?;

    options
        .into_iter()
        .map(|(key, value)| {
            if allowed.contains(&key) {
                Ok((key.to_string(), value))
            } else {
                Err(line.syntax_error(
                    ErrorCode::E101,
                    format!("unknown option `{key}`, expected one of: {}", allowed.join(", ")),
                ))
            }
        })
        .collect()
}

fn take_option(options: &mut Vec<(String, String)>, key: &str) -> Option<String> {
    let index = options.iter().position(|(name, _)| name == key)?;
    Some(options.remove(index).1)
}

/// Split a leading branch name from trailing options.
fn split_name(text: &str) -> (&str, &str) {
    if let Some(quoted) = text.strip_prefix('"')
        && let Some(close) = quoted.find('"')
    {
        return (&quoted[..close], &quoted[close + 1..]);
    }
    match text.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest),
        None => (text, ""),
    }
}

#[derive(Debug, Default)]
struct GitGraphState {
    commands: Vec<GitCommand>,
}

impl GitGraphState {
    fn push(&mut self, line: &SourceLine<'_>, kind: GitCommandKind) {
        self.commands.push(GitCommand {
            kind,
            position: line.position(),
        });
    }

    fn commit(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "commit") else {
            return Ok(false);
        };
        let mut options = parse_options(line, rest, &["id", "msg", "tag", "type"])?;
        self.push(
            line,
            GitCommandKind::Commit {
                id: take_option(&mut options, "id"),
                message: take_option(&mut options, "msg"),
                tag: take_option(&mut options, "tag"),
                commit_type: take_option(&mut options, "type"),
            },
        );
        Ok(true)
    }

    fn branch(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "branch") else {
            return Ok(false);
        };
        let (name, rest) = split_name(rest);
        if name.is_empty() {
            return Err(line.syntax_error(ErrorCode::E100, "`branch` needs a name"));
        }
        let mut options = parse_options(line, rest, &["order"])?;
        let order = take_option(&mut options, "order")
            .map(|order| {
                order.parse::<i64>().map_err(|_| {
                    line.syntax_error(
                        ErrorCode::E101,
                        format!("branch order `{order}` is not an integer"),
                    )
                })
            })
            .transpose()?;

        self.push(
            line,
            GitCommandKind::Branch {
                name: name.to_string(),
                order,
            },
        );
        Ok(true)
    }

    fn checkout(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) =
            strip_keyword(line.text, "checkout").or_else(|| strip_keyword(line.text, "switch"))
        else {
            return Ok(false);
        };
        let branch = unquote(rest);
        if branch.is_empty() || branch.contains(char::is_whitespace) {
            return Err(line.syntax_error(ErrorCode::E100, "`checkout` needs one branch name"));
        }
        self.push(
            line,
            GitCommandKind::Checkout {
                branch: branch.to_string(),
            },
        );
        Ok(true)
    }

    fn merge(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "merge") else {
            return Ok(false);
        };
        let (branch, rest) = split_name(rest);
        if branch.is_empty() {
            return Err(line.syntax_error(ErrorCode::E100, "`merge` needs a branch name"));
        }
        let mut options = parse_options(line, rest, &["id", "tag", "type"])?;
        self.push(
            line,
            GitCommandKind::Merge {
                branch: branch.to_string(),
                id: take_option(&mut options, "id"),
                tag: take_option(&mut options, "tag"),
                commit_type: take_option(&mut options, "type"),
            },
        );
        Ok(true)
    }

    fn cherry_pick(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "cherry-pick") else {
            return Ok(false);
        };
        let mut options = parse_options(line, rest, &["id", "parent"])?;
        let id = take_option(&mut options, "id")
            .ok_or_else(|| line.syntax_error(ErrorCode::E101, "`cherry-pick` needs an `id`"))?;
        self.push(
            line,
            GitCommandKind::CherryPick {
                id,
                parent: take_option(&mut options, "parent"),
            },
        );
        Ok(true)
    }
}

/// Parser for `gitGraph`.
pub struct GitGraphParser;

impl DiagramParser for GitGraphParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::GitGraph]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = source.require_header()?;
        let Some(rest) = strip_keyword_colon(header.text, "gitGraph") else {
            return Err(ParseError::header(
                ErrorCode::E002,
                header.position(),
                format!("expected `gitGraph` header, found `{}`", header.text),
            ));
        };
        let modifier = rest.trim_end_matches(':').trim();
        let direction = match modifier {
            "" => None,
            "LR" => Some(Direction::LeftRight),
            "TB" => Some(Direction::TopBottom),
            "BT" => Some(Direction::BottomTop),
            _ => return Err(unexpected_modifier(header, "gitGraph", modifier)),
        };

        let mut state = GitGraphState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        Ok(Diagram::GitGraph(GitGraphDiagram {
            header: diagram_header(DiagramKind::GitGraph, source, header),
            direction,
            commands: state.commands,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GitGraphDiagram {
        match GitGraphParser.parse_str(text, 0).unwrap() {
            Diagram::GitGraph(diagram) => diagram,
            other => panic!("expected gitGraph, got {other:?}"),
        }
    }

    #[test]
    fn test_header_forms() {
        assert_eq!(parse("gitGraph\ncommit").direction, None);
        assert_eq!(parse("gitGraph:\ncommit").direction, None);
        assert_eq!(
            parse("gitGraph TB:\ncommit").direction,
            Some(Direction::TopBottom)
        );

        let err = GitGraphParser.parse_str("gitGraph RL", 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E003);
    }

    #[test]
    fn test_commands() {
        let diagram = parse(
            "gitGraph\ncommit id: \"init\" msg: \"first commit\" type: HIGHLIGHT\nbranch develop order: 2\ncheckout develop\ncommit\nswitch main\nmerge develop tag: \"v1\"\ncherry-pick id: \"init\" parent: \"p\"",
        );

        let kinds: Vec<_> = diagram.commands.iter().map(|command| &command.kind).collect();
        assert_eq!(
            kinds[0],
            &GitCommandKind::Commit {
                id: Some("init".to_string()),
                message: Some("first commit".to_string()),
                tag: None,
                commit_type: Some("HIGHLIGHT".to_string()),
            }
        );
        assert_eq!(
            kinds[1],
            &GitCommandKind::Branch {
                name: "develop".to_string(),
                order: Some(2),
            }
        );
        assert_eq!(
            kinds[4],
            &GitCommandKind::Checkout {
                branch: "main".to_string()
            }
        );
        assert!(matches!(
            kinds[5],
            GitCommandKind::Merge { branch, tag: Some(tag), .. } if branch == "develop" && tag == "v1"
        ));
        assert!(matches!(
            kinds[6],
            GitCommandKind::CherryPick { id, parent: Some(_) } if id == "init"
        ));
    }

    #[test]
    fn test_unknown_option() {
        let err = GitGraphParser
            .parse_str("gitGraph\ncommit colour: red", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E101);
    }

    #[test]
    fn test_cherry_pick_needs_id() {
        let err = GitGraphParser
            .parse_str("gitGraph\ncherry-pick parent: \"x\"", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E101);
    }
}
