use crate::output::Output;
use color_eyre::Result;
use dialoguer::Input;

/// Read one line from the terminal. Runs on the blocking pool so Ctrl-C
/// stays observable while the prompt waits.
pub async fn prompt_string(prompt: &str) -> Result<String> {
    let prompt = prompt.to_string();

    tokio::task::spawn_blocking(move || {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| color_eyre::eyre::eyre!("Prompt task failed: {}", e))?
    .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt until the answer is a whole number. Empty input yields `None`.
pub async fn prompt_number(prompt: &str, output: &Output) -> Result<Option<usize>> {
    loop {
        let input = prompt_string(prompt).await?;
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Ok(None);
        }

        match trimmed.parse::<usize>() {
            Ok(num) => return Ok(Some(num)),
            Err(_) => output.error("Invalid input. Please enter a valid number."),
        }
    }
}

/// Only an answer starting with 'y' or 'Y' counts as yes
pub async fn prompt_yes_no(prompt: &str) -> Result<bool> {
    let answer = prompt_string(&format!("{} (y/N)", prompt)).await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().chars().next(), Some('y') | Some('Y'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" Yes "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("sure"));
    }
}
