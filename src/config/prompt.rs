use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, knowledgeable, and friendly AI assistant. Your goal is to provide detailed, accurate, and comprehensive answers to user questions.

Guidelines for your responses:
- Be specific and detailed rather than vague
- Provide examples when helpful
- Break down complex topics into clear explanations
- If you don't know something, admit it rather than guessing
- Use a conversational but professional tone
- Structure longer responses with clear points or steps
- Be thorough but concise - aim for quality over brevity

Always strive to give the most helpful and complete answer possible.";

/// Sent by `--probe`; short enough that any working model answers quickly.
pub const PROBE_PROMPT: &str = "Hello! Just say \"Hi\" back.";

#[derive(Debug)]
pub enum PromptError {
    Empty(String),
    IoError(std::io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Empty(path) => write!(f, "System prompt file '{}' is empty", path),
            PromptError::IoError(e) => write!(f, "System prompt file IO error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

/// Reads the system prompt from `path`, or returns the built-in one.
pub fn load_system_prompt(path: Option<&str>) -> Result<String, PromptError> {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
    };

    let contents = fs::read_to_string(Path::new(path))?;
    let prompt = contents.trim();
    if prompt.is_empty() {
        return Err(PromptError::Empty(path.to_string()));
    }
    info!("Loaded system prompt from: {}", path);
    Ok(prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn prompt_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_prompt_without_path() {
        assert_eq!(load_system_prompt(None).unwrap(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(load_system_prompt(Some("  ")).unwrap(), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn reads_and_trims_prompt_file() {
        let file = prompt_file("\n  You are terse.  \n");
        let prompt = load_system_prompt(file.path().to_str()).unwrap();
        assert_eq!(prompt, "You are terse.");
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = prompt_file("   \n");
        assert!(matches!(load_system_prompt(file.path().to_str()), Err(PromptError::Empty(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_system_prompt(Some("/definitely/not/here/prompt.txt"));
        assert!(matches!(result, Err(PromptError::IoError(_))));
    }
}
