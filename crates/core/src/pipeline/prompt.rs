use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use crate::dictionary::domain::arpabet::check_transcription;
use crate::dictionary::domain::dictionary_checker::DictionaryMiss;
use crate::dictionary::domain::dictionary_error::DictionaryError;
use crate::dictionary::domain::pronunciation_dictionary::{Pronunciation, PronunciationDictionary};

/// Interactive questions asked during a run.
pub trait Prompter: Send {
    /// Ask `question` and return the answer line, or `None` when no answer
    /// can be given (end of input, prompting disabled).
    fn ask(&mut self, question: &str) -> Option<String>;

    /// Show a message to the person answering.
    fn tell(&mut self, message: &str);
}

/// Never asks; every question goes unanswered.
#[derive(Debug, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn ask(&mut self, _question: &str) -> Option<String> {
        None
    }

    fn tell(&mut self, _message: &str) {}
}

/// Line-based prompter over any reader/writer pair.
pub struct StdinPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdinPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl StdinPrompter<io::BufReader<io::Stdin>, io::Stderr> {
    /// Questions on stderr, answers from stdin.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompter for StdinPrompter<R, W> {
    fn ask(&mut self, question: &str) -> Option<String> {
        write!(self.output, "{question} ").ok()?;
        self.output.flush().ok()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn tell(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }
}

/// Ask for an ARPAbet transcription of each unknown word.
///
/// Invalid answers are explained and asked again; an empty answer skips the
/// word. Several pronunciations may be given separated by commas.
pub fn ask_pronunciations(
    prompter: &mut dyn Prompter,
    misses: &[DictionaryMiss],
) -> PronunciationDictionary {
    let mut added = PronunciationDictionary::new();
    let mut asked: HashSet<&str> = HashSet::new();
    for miss in misses {
        if !asked.insert(miss.word.as_str()) {
            continue;
        }
        prompter.tell(&format!(
            "Unknown word '{}' on line {}: {}",
            miss.word, miss.line, miss.text
        ));
        loop {
            let Some(answer) = prompter.ask(&format!(
                "Transcription for '{}' (blank to skip):",
                miss.word
            )) else {
                return added;
            };
            if answer.is_empty() {
                break;
            }
            match parse_answer(&answer) {
                Ok(pronunciations) => {
                    for pronunciation in pronunciations {
                        added.add(&miss.word, pronunciation);
                    }
                    log::info!("Added pronunciation for '{}'", miss.word);
                    break;
                }
                Err(e) => prompter.tell(&format!("Invalid transcription: {e}")),
            }
        }
    }
    added
}

fn parse_answer(answer: &str) -> Result<Vec<Pronunciation>, DictionaryError> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(check_transcription)
        .collect()
}

/// Ask whether to keep going after a failed utterance. Anything but a
/// clear "no" continues.
pub fn confirm_continue(prompter: &mut dyn Prompter, failure: &str) -> bool {
    prompter.tell(failure);
    match prompter.ask("Continue aligning? [Y/n]") {
        Some(answer) => !matches!(answer.to_ascii_lowercase().as_str(), "n" | "no"),
        None => true,
    }
}
