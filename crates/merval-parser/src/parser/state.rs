//! `stateDiagram` / `stateDiagram-v2` parser.

use log::debug;
use merval_core::ast::{
    Diagram, DiagramKind, Direction, StateDiagram,
    state::{
        NoteSide, StateDeclaration, StateDescription, StateKind, StateNote, TERMINAL_STATE,
        Transition, TransitionKind,
    },
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, is_identifier, non_empty, split_label, strip_keyword},
    parser::{
        DiagramParser, Rule, diagram_header, parse_direction, run_cascade, unexpected_modifier,
    },
};

const PSEUDOSTATES: [(&str, StateKind); 3] = [
    ("<<fork>>", StateKind::Fork),
    ("<<join>>", StateKind::Join),
    ("<<choice>>", StateKind::Choice),
];

const RULES: &[Rule<StateState>] = &[
    Rule {
        name: "pseudostate",
        handler: StateState::pseudostate,
    },
    Rule {
        name: "state",
        handler: StateState::declaration,
    },
    Rule {
        name: "}",
        handler: StateState::close_composite,
    },
    Rule {
        name: "note",
        handler: StateState::note,
    },
    Rule {
        name: "transition",
        handler: StateState::transition,
    },
    Rule {
        name: "direction",
        handler: StateState::direction,
    },
    Rule {
        name: "--",
        handler: StateState::concurrency,
    },
    Rule {
        name: "description",
        handler: StateState::description,
    },
    Rule {
        name: "state id",
        handler: StateState::bare_state,
    },
];

/// Inside a multi-line note.
const NOTE_RULES: &[Rule<StateState>] = &[
    Rule {
        name: "end note",
        handler: StateState::end_note,
    },
    Rule {
        name: "note text",
        handler: StateState::note_text,
    },
];

#[derive(Debug, Default)]
struct StateState {
    direction: Option<Direction>,
    states: Vec<StateDeclaration>,
    transitions: Vec<Transition>,
    descriptions: Vec<StateDescription>,
    notes: Vec<StateNote>,
    /// Indices into `states` of the open composite states.
    composites: Vec<usize>,
    /// Index into `notes` of an open multi-line note.
    open_note: Option<usize>,
}

impl StateState {
    fn parent(&self) -> Option<String> {
        self.composites
            .last()
            .map(|&index| self.states[index].id.clone())
    }

    fn declare(
        &mut self,
        line: &SourceLine<'_>,
        id: &str,
        kind: StateKind,
        description: Option<String>,
    ) -> Result<()> {
        if !is_identifier(id) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("`{id}` is not a valid state id"),
            ));
        }
        let parent = self.parent();
        self.states.push(StateDeclaration {
            id: id.to_string(),
            kind,
            description,
            parent,
            position: line.position(),
        });
        if kind == StateKind::Composite {
            self.composites.push(self.states.len() - 1);
        }
        Ok(())
    }

    fn pseudostate(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "state") else {
            return Ok(false);
        };
        let Some((id, kind)) = PSEUDOSTATES.iter().find_map(|(marker, kind)| {
            rest.strip_suffix(marker).map(|id| (id.trim(), *kind))
        }) else {
            return Ok(false);
        };

        self.declare(line, id, kind, None)?;
        Ok(true)
    }

    fn declaration(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "state") else {
            return Ok(false);
        };
        let (rest, kind) = match rest.strip_suffix('{') {
            Some(rest) => (rest.trim_end(), StateKind::Composite),
            None => (rest, StateKind::Simple),
        };

        if let Some(quoted) = rest.strip_prefix('"') {
            let Some((text, tail)) = quoted.split_once('"') else {
                return Err(line.syntax_error(ErrorCode::E100, "unterminated state text"));
            };
            let Some(id) = strip_keyword(tail.trim_start(), "as") else {
                return Err(line.syntax_error(
                    ErrorCode::E100,
                    "expected `as ID` after quoted state text",
                ));
            };
            self.declare(line, id, kind, non_empty(text))?;
        } else {
            self.declare(line, rest, kind, None)?;
        }
        Ok(true)
    }

    fn close_composite(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "}" {
            return Ok(false);
        }
        self.composites.pop().ok_or_else(|| {
            line.structural_error(ErrorCode::E201, "`}` without an open composite state")
        })?;
        Ok(true)
    }

    fn note(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "note") else {
            return Ok(false);
        };
        let (side, rest) = if let Some(rest) = rest.strip_prefix("left of") {
            (NoteSide::Left, rest)
        } else if let Some(rest) = rest.strip_prefix("right of") {
            (NoteSide::Right, rest)
        } else {
            return Err(line.syntax_error(
                ErrorCode::E100,
                "expected `left of` or `right of` after `note`",
            ));
        };

        let (target, text) = split_label(rest);
        let target = target.trim();
        if !is_identifier(target) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("`{target}` is not a valid note target"),
            ));
        }

        self.notes.push(StateNote {
            side,
            target: target.to_string(),
            text: text.unwrap_or_default().to_string(),
            position: line.position(),
        });
        if text.is_none() {
            self.open_note = Some(self.notes.len() - 1);
        }
        Ok(true)
    }

    fn end_note(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "end note" {
            return Ok(false);
        }
        self.open_note = None;
        Ok(true)
    }

    fn note_text(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if let Some(note) = self.open_note.and_then(|index| self.notes.get_mut(index)) {
            if !note.text.is_empty() {
                note.text.push('\n');
            }
            note.text.push_str(line.text);
        }
        Ok(true)
    }

    fn transition(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (head, label) = split_label(line.text);
        let Some((from, to)) = head.split_once("-->") else {
            return Ok(false);
        };
        let (from, to) = (from.trim(), to.trim());
        for endpoint in [from, to] {
            if endpoint != TERMINAL_STATE && !is_identifier(endpoint) {
                return Err(line.syntax_error(
                    ErrorCode::E100,
                    format!("`{endpoint}` is not a valid transition endpoint"),
                ));
            }
        }

        let kind = if from == TERMINAL_STATE {
            TransitionKind::Start
        } else if to == TERMINAL_STATE {
            TransitionKind::End
        } else {
            TransitionKind::Regular
        };
        self.transitions.push(Transition {
            from: from.to_string(),
            to: to.to_string(),
            kind,
            label: label.and_then(non_empty),
            parent: self.parent(),
            position: line.position(),
        });
        Ok(true)
    }

    fn direction(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "direction") else {
            return Ok(false);
        };
        self.direction = Some(parse_direction(line, rest)?);
        Ok(true)
    }

    fn concurrency(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "--" {
            return Ok(false);
        }
        if self.composites.is_empty() {
            return Err(line.structural_error(
                ErrorCode::E201,
                "`--` separator outside of a composite state",
            ));
        }
        Ok(true)
    }

    fn description(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (state, Some(text)) = split_label(line.text) else {
            return Ok(false);
        };
        if !is_identifier(state) {
            return Ok(false);
        }
        self.descriptions.push(StateDescription {
            state: state.to_string(),
            text: text.to_string(),
            position: line.position(),
        });
        Ok(true)
    }

    fn bare_state(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if !is_identifier(line.text) {
            return Ok(false);
        }
        self.declare(line, line.text, StateKind::Simple, None)?;
        Ok(true)
    }
}

/// Parser for `stateDiagram` and `stateDiagram-v2`.
pub struct StateParser;

impl DiagramParser for StateParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::State, DiagramKind::StateV2]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let (header, keyword, rest) =
            source.expect_header_any(&["stateDiagram-v2", "stateDiagram"])?;
        if !rest.is_empty() {
            return Err(unexpected_modifier(header, keyword, rest));
        }
        let kind = if keyword == "stateDiagram-v2" {
            DiagramKind::StateV2
        } else {
            DiagramKind::State
        };
        debug!(kind:? = kind; "Parsing state diagram");

        let mut state = StateState::default();
        for line in source.body() {
            let rules = if state.open_note.is_some() {
                NOTE_RULES
            } else {
                RULES
            };
            run_cascade(&mut state, rules, line)?;
        }

        if let Some(note) = state.open_note.and_then(|index| state.notes.get(index)) {
            return Err(ParseError::structural(
                ErrorCode::E200,
                note.position,
                format!("note on `{}` is never closed with `end note`", note.target),
            ));
        }
        if let Some(&index) = state.composites.last() {
            let composite = &state.states[index];
            return Err(ParseError::structural(
                ErrorCode::E200,
                composite.position,
                format!("composite state `{}` is never closed with `}}`", composite.id),
            ));
        }

        Ok(Diagram::State(StateDiagram {
            header: diagram_header(kind, source, header),
            direction: state.direction,
            states: state.states,
            transitions: state.transitions,
            descriptions: state.descriptions,
            notes: state.notes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use merval_core::position::Position;

    use super::*;

    fn parse(text: &str) -> StateDiagram {
        match StateParser.parse_str(text, 0).unwrap() {
            Diagram::State(diagram) => diagram,
            other => panic!("expected state diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_header_kind_preserved() {
        assert_eq!(parse("stateDiagram\nA").header.kind, DiagramKind::State);
        assert_eq!(parse("stateDiagram-v2\nA").header.kind, DiagramKind::StateV2);
    }

    #[test]
    fn test_transition_kinds() {
        let diagram = parse("stateDiagram-v2\n[*] --> Idle\nIdle --> Busy : start\nBusy --> [*]\n[*] --> [*]");

        let kinds: Vec<_> = diagram.transitions.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [
                TransitionKind::Start,
                TransitionKind::Regular,
                TransitionKind::End,
                TransitionKind::Start,
            ]
        );
        assert_eq!(diagram.transitions[1].label.as_deref(), Some("start"));
    }

    #[test]
    fn test_pseudostates_and_named_states() {
        let diagram = parse(
            "stateDiagram-v2\nstate fork_1 <<fork>>\nstate pick <<choice>>\nstate \"Waiting for input\" as Waiting",
        );

        assert_eq!(diagram.states[0].kind, StateKind::Fork);
        assert_eq!(diagram.states[1].kind, StateKind::Choice);
        assert_eq!(diagram.states[2].id, "Waiting");
        assert_eq!(
            diagram.states[2].description.as_deref(),
            Some("Waiting for input")
        );
    }

    #[test]
    fn test_composite_states_record_parent() {
        let diagram = parse(
            "stateDiagram-v2\nstate Active {\n  [*] --> Running\n  --\n  state Inner {\n    Deep\n  }\n}\nActive : doing work",
        );

        assert_eq!(diagram.states[0].kind, StateKind::Composite);
        assert_eq!(diagram.transitions[0].parent.as_deref(), Some("Active"));
        assert_eq!(diagram.states[1].parent.as_deref(), Some("Active"));
        assert_eq!(diagram.states[2].parent.as_deref(), Some("Inner"));
        assert_eq!(diagram.descriptions[0].state, "Active");
    }

    #[test]
    fn test_notes_single_and_multi_line() {
        let diagram = parse(
            "stateDiagram-v2\nA\nnote left of A : short\nnote right of A\n  line one\n  line two\nend note",
        );

        assert_eq!(diagram.notes[0].side, NoteSide::Left);
        assert_eq!(diagram.notes[0].text, "short");
        assert_eq!(diagram.notes[1].text, "line one\nline two");
    }

    #[test]
    fn test_unclosed_composite() {
        let err = StateParser
            .parse_str("stateDiagram-v2\nstate Outer {\n  A --> B", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E200);
        assert_eq!(err.position(), Position::new(2, 1));
    }

    #[test]
    fn test_unclosed_note() {
        let err = StateParser
            .parse_str("stateDiagram\nnote left of A\ntext", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E200);
    }

    #[test]
    fn test_stray_close_brace() {
        let err = StateParser.parse_str("stateDiagram\n}", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E201);
    }
}
