//! `sequenceDiagram` parser.

use std::cmp::Reverse;

use merval_core::ast::{
    Diagram, DiagramKind, SequenceDiagram,
    sequence::{
        Activation, ActivationMarker, BlockKind, BlockSection, Message, MessageArrow,
        NotePlacement, Participant, ParticipantKind, SequenceBlock, SequenceNote,
    },
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, is_identifier, non_empty, split_label, strip_keyword, strip_keyword_colon},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

/// Message arrows, longest first where they share a prefix.
const ARROWS: [(&str, MessageArrow); 10] = [
    ("<<-->>", MessageArrow::DottedBidirectional),
    ("<<->>", MessageArrow::SolidBidirectional),
    ("-->>", MessageArrow::DottedArrow),
    ("->>", MessageArrow::SolidArrow),
    ("-->", MessageArrow::Dotted),
    ("->", MessageArrow::Solid),
    ("--x", MessageArrow::DottedCross),
    ("-x", MessageArrow::SolidCross),
    ("--)", MessageArrow::DottedAsync),
    ("-)", MessageArrow::SolidAsync),
];

const BLOCKS: [(&str, BlockKind); 7] = [
    ("loop", BlockKind::Loop),
    ("alt", BlockKind::Alt),
    ("opt", BlockKind::Opt),
    ("par", BlockKind::Par),
    ("critical", BlockKind::Critical),
    ("break", BlockKind::Break),
    ("rect", BlockKind::Rect),
];

/// Continuation keywords and the block kind each one belongs to.
const SECTIONS: [(&str, BlockKind); 3] = [
    ("else", BlockKind::Alt),
    ("and", BlockKind::Par),
    ("option", BlockKind::Critical),
];

const RULES: &[Rule<SequenceState>] = &[
    Rule {
        name: "participant",
        handler: SequenceState::participant,
    },
    Rule {
        name: "activate",
        handler: SequenceState::activation,
    },
    Rule {
        name: "note",
        handler: SequenceState::note,
    },
    Rule {
        name: "block",
        handler: SequenceState::block_open,
    },
    Rule {
        name: "block section",
        handler: SequenceState::block_section,
    },
    Rule {
        name: "end",
        handler: SequenceState::block_end,
    },
    Rule {
        name: "autonumber",
        handler: SequenceState::autonumber,
    },
    Rule {
        name: "title",
        handler: SequenceState::title,
    },
    Rule {
        name: "message",
        handler: SequenceState::message,
    },
];

#[derive(Debug, Default)]
struct SequenceState {
    title: Option<String>,
    autonumber: bool,
    participants: Vec<Participant>,
    messages: Vec<Message>,
    notes: Vec<SequenceNote>,
    activations: Vec<Activation>,
    blocks: Vec<SequenceBlock>,
    /// Indices into `blocks` of the open blocks, innermost last.
    open: Vec<usize>,
}

impl SequenceState {
    fn participant(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (kind, rest) = match (
            strip_keyword(line.text, "participant"),
            strip_keyword(line.text, "actor"),
        ) {
            (Some(rest), _) => (ParticipantKind::Participant, rest),
            (None, Some(rest)) => (ParticipantKind::Actor, rest),
            (None, None) => return Ok(false),
        };

        let (id, alias) = match rest.split_once(" as ") {
            Some((id, alias)) => (id.trim(), non_empty(alias)),
            None => (rest, None),
        };
        if !is_identifier(id) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("`{id}` is not a valid participant id"),
            ));
        }

        self.participants.push(Participant {
            kind,
            id: id.to_string(),
            alias,
            position: line.position(),
        });
        Ok(true)
    }

    fn activation(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (active, rest) = match (
            strip_keyword(line.text, "activate"),
            strip_keyword(line.text, "deactivate"),
        ) {
            (Some(rest), _) => (true, rest),
            (None, Some(rest)) => (false, rest),
            (None, None) => return Ok(false),
        };
        if !is_identifier(rest) {
            return Err(line.syntax_error(ErrorCode::E100, "expected a participant id"));
        }

        self.activations.push(Activation {
            participant: rest.to_string(),
            active,
            position: line.position(),
        });
        Ok(true)
    }

    fn note(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) =
            strip_keyword(line.text, "note").or_else(|| strip_keyword(line.text, "Note"))
        else {
            return Ok(false);
        };

        let (placement, targets) = if let Some(targets) = rest.strip_prefix("left of") {
            (NotePlacement::LeftOf, targets)
        } else if let Some(targets) = rest.strip_prefix("right of") {
            (NotePlacement::RightOf, targets)
        } else if let Some(targets) = strip_keyword(rest, "over") {
            (NotePlacement::Over, targets)
        } else {
            return Err(line.syntax_error(
                ErrorCode::E100,
                "expected `left of`, `right of` or `over` after `note`",
            ));
        };

        let (targets, text) = split_label(targets);
        let Some(text) = text else {
            return Err(line.syntax_error(ErrorCode::E100, "note needs `: text`"));
        };
        let participants: Vec<String> = targets
            .split(',')
            .map(str::trim)
            .map(str::to_string)
            .collect();
        let valid_count = match placement {
            NotePlacement::Over => (1..=2).contains(&participants.len()),
            _ => participants.len() == 1,
        };
        if !valid_count || !participants.iter().all(|id| is_identifier(id)) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("invalid note target `{}`", targets.trim()),
            ));
        }

        self.notes.push(SequenceNote {
            placement,
            participants,
            text: text.to_string(),
            position: line.position(),
        });
        Ok(true)
    }

    fn block_open(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((kind, rest)) = BLOCKS
            .iter()
            .find_map(|(keyword, kind)| strip_keyword(line.text, keyword).map(|rest| (*kind, rest)))
        else {
            return Ok(false);
        };

        self.blocks.push(SequenceBlock {
            kind,
            label: non_empty(rest),
            sections: Vec::new(),
            depth: self.open.len(),
            position: line.position(),
            end_position: line.position(),
        });
        self.open.push(self.blocks.len() - 1);
        Ok(true)
    }

    fn block_section(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((keyword, owner, rest)) = SECTIONS.iter().find_map(|(keyword, kind)| {
            strip_keyword(line.text, keyword).map(|rest| (*keyword, *kind, rest))
        }) else {
            return Ok(false);
        };

        let block = self
            .open
            .last()
            .map(|&index| &mut self.blocks[index])
            .filter(|block| block.kind == owner)
            .ok_or_else(|| {
                line.structural_error(
                    ErrorCode::E201,
                    format!("`{keyword}` outside of a matching block"),
                )
            })?;
        block.sections.push(BlockSection {
            label: non_empty(rest),
            position: line.position(),
        });
        Ok(true)
    }

    fn block_end(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "end" {
            return Ok(false);
        }
        let index = self
            .open
            .pop()
            .ok_or_else(|| line.structural_error(ErrorCode::E201, "`end` without an open block"))?;
        self.blocks[index].end_position = line.position();
        Ok(true)
    }

    fn autonumber(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if strip_keyword(line.text, "autonumber").is_none() {
            return Ok(false);
        }
        self.autonumber = true;
        Ok(true)
    }

    fn title(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword_colon(line.text, "title") else {
            return Ok(false);
        };
        self.title = non_empty(rest);
        Ok(true)
    }

    fn message(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (head, text) = split_label(line.text);
        let Some((index, operator, arrow)) = find_arrow(head) else {
            return Ok(false);
        };

        let from = head[..index].trim();
        let (to, activation) = split_activation(&head[index + operator.len()..]);

        // `+` activates the receiver, `-` deactivates the sender.
        match activation {
            Some(ActivationMarker::Activate) => self.activations.push(Activation {
                participant: to.to_string(),
                active: true,
                position: line.position(),
            }),
            Some(ActivationMarker::Deactivate) => self.activations.push(Activation {
                participant: from.to_string(),
                active: false,
                position: line.position(),
            }),
            None => {}
        }

        self.messages.push(Message {
            from: from.to_string(),
            to: to.to_string(),
            arrow,
            activation,
            text: text.and_then(non_empty),
            position: line.position(),
        });
        Ok(true)
    }
}

fn block_keyword(kind: BlockKind) -> &'static str {
    BLOCKS
        .iter()
        .find(|(_, candidate)| *candidate == kind)
        .map_or("block", |(keyword, _)| *keyword)
}

/// Split a leading `+` or `-` activation marker off a message target.
fn split_activation(target: &str) -> (&str, Option<ActivationMarker>) {
    let target = target.trim();
    if let Some(rest) = target.strip_prefix('+') {
        (rest.trim_start(), Some(ActivationMarker::Activate))
    } else if let Some(rest) = target.strip_prefix('-') {
        (rest.trim_start(), Some(ActivationMarker::Deactivate))
    } else {
        (target, None)
    }
}

/// Leftmost arrow with a participant id on both sides; at one position the
/// longest operator wins. Ids may themselves contain `-x`.
fn find_arrow(text: &str) -> Option<(usize, &'static str, MessageArrow)> {
    let mut candidates: Vec<(usize, &'static str, MessageArrow)> = ARROWS
        .iter()
        .flat_map(|&(operator, arrow)| {
            text.match_indices(operator)
                .map(move |(index, _)| (index, operator, arrow))
        })
        .collect();
    candidates.sort_by_key(|&(index, operator, _)| (index, Reverse(operator.len())));

    candidates.into_iter().find(|&(index, operator, _)| {
        let (to, _) = split_activation(&text[index + operator.len()..]);
        is_identifier(text[..index].trim()) && is_identifier(to)
    })
}

/// Parser for `sequenceDiagram`.
pub struct SequenceParser;

impl DiagramParser for SequenceParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Sequence]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "sequenceDiagram")?;

        let mut state = SequenceState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        if let Some(&index) = state.open.last() {
            let block = &state.blocks[index];
            return Err(ParseError::structural(
                ErrorCode::E200,
                block.position,
                format!("`{}` block is never closed with `end`", block_keyword(block.kind)),
            ));
        }

        Ok(Diagram::Sequence(SequenceDiagram {
            header: diagram_header(DiagramKind::Sequence, source, &header),
            title: state.title,
            autonumber: state.autonumber,
            participants: state.participants,
            messages: state.messages,
            notes: state.notes,
            activations: state.activations,
            blocks: state.blocks,
        }))
    }
}

#[cfg(test)]
mod tests {
    use merval_core::position::Position;

    use super::*;

    fn parse(text: &str) -> SequenceDiagram {
        match SequenceParser.parse_str(text, 0).unwrap() {
            Diagram::Sequence(diagram) => diagram,
            other => panic!("expected sequence diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_participants_and_messages() {
        let diagram = parse(
            "sequenceDiagram\nparticipant A as Alice\nactor B\nA->>B: Hello\nB-->>A: Hi back",
        );

        assert_eq!(diagram.participants.len(), 2);
        assert_eq!(diagram.participants[0].alias.as_deref(), Some("Alice"));
        assert_eq!(diagram.participants[1].kind, ParticipantKind::Actor);
        assert_eq!(diagram.messages[0].arrow, MessageArrow::SolidArrow);
        assert_eq!(diagram.messages[1].arrow, MessageArrow::DottedArrow);
        assert_eq!(diagram.messages[1].text.as_deref(), Some("Hi back"));
    }

    #[test]
    fn test_arrow_table() {
        let cases = [
            ("A->B", MessageArrow::Solid),
            ("A-->B", MessageArrow::Dotted),
            ("A-xB", MessageArrow::SolidCross),
            ("A--xB", MessageArrow::DottedCross),
            ("A-)B", MessageArrow::SolidAsync),
            ("A--)B", MessageArrow::DottedAsync),
            ("A<<->>B", MessageArrow::SolidBidirectional),
            ("A<<-->>B", MessageArrow::DottedBidirectional),
        ];
        for (text, arrow) in cases {
            let diagram = parse(&format!("sequenceDiagram\n{text}: m"));
            assert_eq!(diagram.messages[0].arrow, arrow, "{text}");
            assert_eq!(diagram.messages[0].to, "B", "{text}");
        }
    }

    #[test]
    fn test_hyphenated_ids_containing_arrow_fragments() {
        let diagram = parse("sequenceDiagram\nweb-xapi->>B: call\nB--)web-xapi: back");

        assert_eq!(diagram.messages[0].from, "web-xapi");
        assert_eq!(diagram.messages[0].to, "B");
        assert_eq!(diagram.messages[0].arrow, MessageArrow::SolidArrow);
        assert_eq!(diagram.messages[1].to, "web-xapi");
        assert_eq!(diagram.messages[1].arrow, MessageArrow::DottedAsync);
    }

    #[test]
    fn test_activation_shorthand() {
        let diagram = parse("sequenceDiagram\nA->>+B: ask\nB-->>-A: answer");

        assert_eq!(diagram.activations.len(), 2);
        assert!(diagram.activations[0].active);
        assert_eq!(diagram.activations[0].participant, "B");
        assert!(!diagram.activations[1].active);
        assert_eq!(diagram.activations[1].participant, "B");
    }

    #[test]
    fn test_notes() {
        let diagram = parse("sequenceDiagram\nNote over A,B: shared\nnote left of A: solo");

        assert_eq!(diagram.notes[0].placement, NotePlacement::Over);
        assert_eq!(diagram.notes[0].participants, ["A", "B"]);
        assert_eq!(diagram.notes[1].placement, NotePlacement::LeftOf);
    }

    #[test]
    fn test_nested_blocks() {
        let diagram = parse(
            "sequenceDiagram\nloop Every minute\n  alt ok\n    A->>B: x\n  else failed\n    A->>B: y\n  end\nend",
        );

        assert_eq!(diagram.blocks.len(), 2);
        assert_eq!(diagram.blocks[0].kind, BlockKind::Loop);
        assert_eq!(diagram.blocks[0].end_position, Position::new(8, 1));
        assert_eq!(diagram.blocks[1].depth, 1);
        assert_eq!(diagram.blocks[1].sections.len(), 1);
        assert_eq!(diagram.blocks[1].sections[0].label.as_deref(), Some("failed"));
    }

    #[test]
    fn test_else_outside_alt() {
        let err = SequenceParser
            .parse_str("sequenceDiagram\nloop x\nelse y\nend", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E201);
        assert_eq!(err.position(), Position::new(3, 1));
    }

    #[test]
    fn test_unclosed_block() {
        let err = SequenceParser
            .parse_str("sequenceDiagram\nopt maybe\nA->>B: x", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E200);
        assert_eq!(err.message(), "`opt` block is never closed with `end`");
    }

    #[test]
    fn test_header_modifier_rejected() {
        let err = SequenceParser.parse_str("sequenceDiagram LR", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E003);
    }
}
