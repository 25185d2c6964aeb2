//! Source normalization and per-line parsing.
//!
//! A program is stored as its normalized lines: trimmed, with blank and
//! comment-only lines dropped and trailing comments removed. Each line
//! parses into an optional label plus one [`Statement`].

use crate::asm::assembler::AsmError;
use crate::cpu::decode::{self, DecodedInstruction};
use serde::{Serialize, Deserialize};

/// One normalized source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// 1-based line number in the text as loaded.
    pub number: usize,
    pub text: String,
}

/// A normalized program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub lines: Vec<SourceLine>,
    /// True if the loader had to add the closing `END`.
    pub end_appended: bool,
}

impl Program {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// What a line does once its label is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Nothing after the label.
    Empty,
    Org(u16),
    End,
    Data(Data),
    Instruction(DecodedInstruction),
}

/// Data directive payloads. Byte and word items stay as text so they
/// can name labels resolved in pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Bytes(Vec<String>),
    Words(Vec<String>),
    Text(Vec<u8>),
    Reserve(u16),
}

impl Data {
    /// Bytes of address space the directive occupies.
    pub fn size(&self) -> u16 {
        match self {
            Data::Bytes(items) => items.len() as u16,
            Data::Words(items) => (items.len() * 2) as u16,
            Data::Text(bytes) => bytes.len() as u16,
            Data::Reserve(n) => *n,
        }
    }
}

/// A parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub label: Option<String>,
    pub statement: Statement,
}

/// Normalize program text.
///
/// Fails with [`AsmError::EmptyProgram`] if no code remains. A missing
/// final `END` is appended with a warning.
pub fn normalize(text: &str) -> Result<Program, AsmError> {
    let mut lines = Vec::new();
    let mut last_number = 0;

    for (idx, raw) in text.lines().enumerate() {
        last_number = idx + 1;
        let cleaned = decode::strip_comment(raw);
        if cleaned.is_empty() {
            continue;
        }
        lines.push(SourceLine {
            number: idx + 1,
            text: cleaned.to_string(),
        });
    }

    if lines.is_empty() {
        return Err(AsmError::EmptyProgram);
    }

    let ends = lines
        .last()
        .is_some_and(|line| is_end(&line.text));
    let end_appended = !ends;
    if end_appended {
        log::warn!("program does not end with END; appending it");
        lines.push(SourceLine {
            number: last_number + 1,
            text: "END".to_string(),
        });
    }

    Ok(Program { lines, end_appended })
}

/// True for an `END` line (with or without a label or operand).
pub fn is_end(text: &str) -> bool {
    let body = decode::remove_label(text);
    decode::split_mnemonic(body).0 == "END"
}

/// Parse one normalized line.
pub fn parse_line(line: &SourceLine) -> Result<Parsed, AsmError> {
    let label = decode::extract_label(&line.text);
    let body = decode::remove_label(&line.text);
    if body.is_empty() {
        return Ok(Parsed { label, statement: Statement::Empty });
    }

    let (word, operand) = decode::split_mnemonic(body);
    let bad = |reason: &str| AsmError::BadDirective {
        line: line.number,
        directive: word.clone(),
        reason: reason.to_string(),
    };

    let statement = match word.as_str() {
        "END" => Statement::End,
        "ORG" => Statement::Org(parse_address(operand).ok_or_else(|| bad("expected an address"))?),
        "FCB" => Statement::Data(Data::Bytes(split_items(operand).ok_or_else(|| bad("expected values"))?)),
        "FDB" => Statement::Data(Data::Words(split_items(operand).ok_or_else(|| bad("expected values"))?)),
        "FCC" => Statement::Data(Data::Text(delimited(operand).ok_or_else(|| bad("expected delimited text"))?)),
        "RMB" => Statement::Data(Data::Reserve(parse_address(operand).ok_or_else(|| bad("expected a count"))?)),
        _ => Statement::Instruction(decode::decode_statement(body).map_err(|source| {
            AsmError::Decode { line: line.number, source }
        })?),
    };

    Ok(Parsed { label, statement })
}

fn parse_address(operand: &str) -> Option<u16> {
    let value = decode::parse_number(operand.trim()).ok()?;
    u16::try_from(value).ok()
}

fn split_items(operand: &str) -> Option<Vec<String>> {
    if operand.is_empty() {
        return None;
    }
    let items: Vec<String> = operand
        .split(',')
        .map(|item| item.trim().to_ascii_uppercase())
        .collect();
    if items.iter().any(|item| item.is_empty()) {
        return None;
    }
    Some(items)
}

/// `/text/`, `"text"` or any other repeated delimiter.
fn delimited(operand: &str) -> Option<Vec<u8>> {
    let mut chars = operand.chars();
    let delim = chars.next()?;
    let rest = chars.as_str();
    let end = rest.find(delim)?;
    Some(rest[..end].bytes().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::AddrMode;

    fn line(text: &str) -> SourceLine {
        SourceLine { number: 1, text: text.to_string() }
    }

    #[test]
    fn test_normalize_strips_comments_and_blanks() {
        let program = normalize("; header\n\n  LDA #1  ; load\nSTART: NOP\n  END\n").unwrap();
        let texts: Vec<&str> = program.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["LDA #1", "START: NOP", "END"]);
        assert_eq!(program.lines[0].number, 3);
        assert!(!program.end_appended);
    }

    #[test]
    fn test_normalize_appends_end() {
        let program = normalize("NOP\nNOP").unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.lines[2].text, "END");
        assert_eq!(program.lines[2].number, 3);
        assert!(program.end_appended);
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), Err(AsmError::EmptyProgram));
        assert_eq!(normalize("; only a comment\n   \n"), Err(AsmError::EmptyProgram));
    }

    #[test]
    fn test_parse_statements() {
        let parsed = parse_line(&line("LOOP: DECA")).unwrap();
        assert_eq!(parsed.label.as_deref(), Some("LOOP"));
        match parsed.statement {
            Statement::Instruction(instr) => {
                assert_eq!(instr.mnemonic, "DECA");
                assert_eq!(instr.mode, AddrMode::Inherent);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(parse_line(&line("ORG $FC00")).unwrap().statement, Statement::Org(0xFC00));
        assert_eq!(parse_line(&line("END")).unwrap().statement, Statement::End);
        assert_eq!(parse_line(&line("DONE:")).unwrap().statement, Statement::Empty);
        assert_eq!(parse_line(&line("DONE:")).unwrap().label.as_deref(), Some("DONE"));
    }

    #[test]
    fn test_label_without_colon() {
        let parsed = parse_line(&line("START LDA #1")).unwrap();
        assert_eq!(parsed.label.as_deref(), Some("START"));
        assert!(matches!(parsed.statement, Statement::Instruction(ref i) if i.mnemonic == "LDA"));
    }

    #[test]
    fn test_data_directives() {
        let fcb = parse_line(&line("TABLE FCB 1,2,$FF")).unwrap();
        assert_eq!(fcb.label.as_deref(), Some("TABLE"));
        assert_eq!(fcb.statement, Statement::Data(Data::Bytes(vec!["1".into(), "2".into(), "$FF".into()])));

        let fdb = parse_line(&line("FDB START,$1234")).unwrap().statement;
        assert!(matches!(fdb, Statement::Data(ref d) if d.size() == 4));

        let fcc = parse_line(&line("FCC /HI/")).unwrap().statement;
        assert_eq!(fcc, Statement::Data(Data::Text(b"HI".to_vec())));

        let rmb = parse_line(&line("RMB $10")).unwrap().statement;
        assert_eq!(rmb, Statement::Data(Data::Reserve(0x10)));
    }

    #[test]
    fn test_bad_directives() {
        assert!(matches!(parse_line(&line("ORG")), Err(AsmError::BadDirective { .. })));
        assert!(matches!(parse_line(&line("ORG -1")), Err(AsmError::BadDirective { .. })));
        assert!(matches!(parse_line(&line("FCB 1,,2")), Err(AsmError::BadDirective { .. })));
        assert!(matches!(parse_line(&line("FCC /open")), Err(AsmError::BadDirective { .. })));
    }

    #[test]
    fn test_decode_error_carries_line() {
        let err = parse_line(&SourceLine { number: 7, text: "LDA [$10".into() }).unwrap_err();
        assert!(matches!(err, AsmError::Decode { line: 7, .. }));
    }

    #[test]
    fn test_is_end() {
        assert!(is_end("END"));
        assert!(is_end("end start"));
        assert!(is_end("DONE: END"));
        assert!(!is_end("ENDX"));
    }
}
