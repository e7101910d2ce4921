//! Parsing of model output: echo stripping, Prover9 block extraction, final answers.
//!
//! Engines differ in whether they echo the prompt before the completion, so
//! every generation goes through [`strip_echo`] before anything looks at it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Opening delimiter of the symbolic program
pub const BEGIN_MARKER: &str = "BEGIN_PROVER9_INPUT";

/// Closing delimiter of the symbolic program; also the stage-1 stop sequence
pub const END_MARKER: &str = "END_PROVER9_INPUT";

/// Why no program could be taken from a stage-1 generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionError {
    /// No `BEGIN_PROVER9_INPUT` anywhere in the text
    MissingBegin,
    /// `BEGIN_PROVER9_INPUT` without a following `END_PROVER9_INPUT`
    Unterminated,
    /// A well-formed pair with nothing but whitespace inside
    EmptyBlock,
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::MissingBegin => write!(f, "no {} marker found", BEGIN_MARKER),
            ExtractionError::Unterminated => {
                write!(f, "{} without a matching {}", BEGIN_MARKER, END_MARKER)
            }
            ExtractionError::EmptyBlock => write!(f, "prover block is empty"),
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Drop the echoed prompt from raw engine output
///
/// If `prompt` occurs in `raw`, everything up to and including its first
/// occurrence is removed. Otherwise `raw` is returned unchanged.
pub fn strip_echo<'a>(raw: &'a str, prompt: &str) -> &'a str {
    if prompt.is_empty() {
        return raw;
    }
    match raw.find(prompt) {
        Some(start) => &raw[start + prompt.len()..],
        None => raw,
    }
}

/// Append `terminator` unless the text already ends with it
///
/// For engines that stop on the stop sequence without printing it.
pub fn restore_terminator(text: &str, terminator: &str) -> String {
    if text.trim_end().ends_with(terminator) {
        text.to_string()
    } else {
        format!("{}{}", text, terminator)
    }
}

/// Interior of the first complete BEGIN/END pair, trimmed
pub fn extract_block(text: &str) -> Result<&str, ExtractionError> {
    let begin = text.find(BEGIN_MARKER).ok_or(ExtractionError::MissingBegin)?;
    let rest = &text[begin + BEGIN_MARKER.len()..];
    let end = rest.find(END_MARKER).ok_or(ExtractionError::Unterminated)?;
    let interior = rest[..end].trim();
    if interior.is_empty() {
        return Err(ExtractionError::EmptyBlock);
    }
    Ok(interior)
}

/// Extract the program from a stage-1 generation and split its sections
pub fn extract_program(text: &str) -> Result<ProverProgram, ExtractionError> {
    extract_block(text).map(ProverProgram::parse)
}

// =============================================================================
// Prover Program
// =============================================================================

/// A Prover9 program as produced by the model
///
/// `source` is what the prover receives, byte for byte. The section fields are
/// a parsed view for traces and are empty when the model omitted a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverProgram {
    pub source: String,
    /// Body of `formulas(usable).` - general rules
    pub axioms: String,
    /// Body of `formulas(sos).` - case-specific facts
    pub situational: String,
    /// Body of `formulas(goals).`
    pub goal: String,
}

fn section_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)formulas\(\s*(?P<name>\w+)\s*\)\.(?P<body>.*?)end_of_list\.")
            .expect("Invalid formulas section regex")
    })
}

impl ProverProgram {
    pub fn parse(source: &str) -> Self {
        let mut program = ProverProgram {
            source: source.to_string(),
            axioms: String::new(),
            situational: String::new(),
            goal: String::new(),
        };

        for caps in section_regex().captures_iter(source) {
            let slot = match &caps["name"] {
                "usable" => &mut program.axioms,
                "sos" | "assumptions" => &mut program.situational,
                "goals" => &mut program.goal,
                _ => continue,
            };
            // First list of each kind wins
            if slot.is_empty() {
                *slot = caps["body"].trim().to_string();
            }
        }

        program
    }

    /// Exact text handed to the prover
    pub fn input(&self) -> &str {
        &self.source
    }

    pub fn has_goal(&self) -> bool {
        !self.goal.is_empty()
    }
}

// =============================================================================
// Final Answer
// =============================================================================

/// Terminal answer vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinalAnswer {
    Yes,
    No,
}

fn answer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(yes|no)\b").expect("Invalid answer regex"))
}

impl FinalAnswer {
    /// First standalone yes/no word in the text, case-insensitive
    pub fn parse(text: &str) -> Option<Self> {
        let word = answer_regex().captures(text)?.get(1)?.as_str();
        if word.eq_ignore_ascii_case("yes") {
            Some(FinalAnswer::Yes)
        } else {
            Some(FinalAnswer::No)
        }
    }

    /// Answer following the last `FINAL ANSWER:` label, for texts that include one
    pub fn parse_labeled(text: &str) -> Option<Self> {
        match text.rfind("FINAL ANSWER:") {
            Some(pos) => Self::parse(&text[pos + "FINAL ANSWER:".len()..]),
            None => Self::parse(text),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FinalAnswer::Yes => "YES",
            FinalAnswer::No => "NO",
        }
    }
}

impl fmt::Display for FinalAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "formulas(usable).\n  p(x) -> q(x).\nend_of_list.\nformulas(sos).\n  p(a).\nend_of_list.\nformulas(goals).\n  q(a).\nend_of_list.";

    fn generation() -> String {
        format!("Thought: map predicates.\nAction:\n{}\n{}\n{}\n", BEGIN_MARKER, BLOCK, END_MARKER)
    }

    #[test]
    fn test_strip_echo_removes_prompt_prefix() {
        let prompt = "Context: c\nThought:";
        let raw = format!("{} I will translate.", prompt);
        assert_eq!(strip_echo(&raw, prompt), " I will translate.");
    }

    #[test]
    fn test_strip_echo_without_echo_is_verbatim() {
        assert_eq!(strip_echo("I will translate.", "Context: c"), "I will translate.");
        assert_eq!(strip_echo("text", ""), "text");
    }

    #[test]
    fn test_strip_echo_after_engine_banner() {
        // Some engines print a leading BOS or space before echoing
        let raw = " <s> PROMPT completion";
        assert_eq!(strip_echo(raw, "PROMPT"), " completion");
    }

    #[test]
    fn test_extract_block_returns_trimmed_interior() {
        assert_eq!(extract_block(&generation()), Ok(BLOCK));
    }

    #[test]
    fn test_extract_block_same_with_or_without_echo() {
        let prompt = "PROMPT TEXT\nThought:";
        let echoed = format!("{}{}", prompt, generation());
        let plain = generation();
        assert_eq!(
            extract_block(strip_echo(&echoed, prompt)),
            extract_block(strip_echo(&plain, prompt))
        );
    }

    #[test]
    fn test_extract_block_missing_markers() {
        assert_eq!(
            extract_block("Thought: the answer is yes."),
            Err(ExtractionError::MissingBegin)
        );
    }

    #[test]
    fn test_extract_block_unterminated() {
        let text = format!("{}\nformulas(usable).\n p(x).", BEGIN_MARKER);
        assert_eq!(extract_block(&text), Err(ExtractionError::Unterminated));
    }

    #[test]
    fn test_extract_block_end_before_begin_is_unterminated() {
        let text = format!("{} junk {} p(a).", END_MARKER, BEGIN_MARKER);
        assert_eq!(extract_block(&text), Err(ExtractionError::Unterminated));
    }

    #[test]
    fn test_extract_block_empty() {
        let text = format!("{}\n  \n{}", BEGIN_MARKER, END_MARKER);
        assert_eq!(extract_block(&text), Err(ExtractionError::EmptyBlock));
    }

    #[test]
    fn test_extract_block_first_pair_wins() {
        let text = format!(
            "{b}\nfirst.\n{e}\n{b}\nsecond.\n{e}",
            b = BEGIN_MARKER,
            e = END_MARKER
        );
        assert_eq!(extract_block(&text), Ok("first."));
    }

    #[test]
    fn test_program_sections() {
        let program = extract_program(&generation()).unwrap();
        assert_eq!(program.input(), BLOCK);
        assert_eq!(program.axioms, "p(x) -> q(x).");
        assert_eq!(program.situational, "p(a).");
        assert_eq!(program.goal, "q(a).");
        assert!(program.has_goal());
    }

    #[test]
    fn test_program_without_sections_keeps_source() {
        let program = ProverProgram::parse("p(a) -> q(a).");
        assert_eq!(program.source, "p(a) -> q(a).");
        assert!(program.axioms.is_empty());
        assert!(!program.has_goal());
    }

    #[test]
    fn test_restore_terminator() {
        assert_eq!(restore_terminator("abc\n", "END"), "abc\nEND");
        assert_eq!(restore_terminator("abc END\n", "END"), "abc END\n");
    }

    #[test]
    fn test_final_answer_parse() {
        assert_eq!(FinalAnswer::parse(" YES**\n//end of example"), Some(FinalAnswer::Yes));
        assert_eq!(FinalAnswer::parse("no, it does not follow"), Some(FinalAnswer::No));
        assert_eq!(FinalAnswer::parse("Nothing to say"), None);
        assert_eq!(FinalAnswer::parse("yesterday"), None);
    }

    #[test]
    fn test_final_answer_labeled() {
        let text = "Thought: the premises... yes maybe\nFINAL ANSWER: NO";
        assert_eq!(FinalAnswer::parse_labeled(text), Some(FinalAnswer::No));
        assert_eq!(FinalAnswer::parse_labeled("Yes."), Some(FinalAnswer::Yes));
    }
}
