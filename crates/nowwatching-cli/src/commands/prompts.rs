use color_eyre::Result;
use dialoguer::{Input, Password};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new().with_prompt(prompt).allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder
        .interact_text()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a secret (masked input), optionally asking twice. Empty input is returned as is.
pub fn prompt_secret(prompt: &str, confirm: bool) -> Result<String> {
    let mut password = Password::new().with_prompt(prompt).allow_empty_password(true);
    if confirm {
        password = password.with_confirmation(format!("Confirm {}", prompt), "Values do not match");
    }
    password
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read {}: {}", prompt, e))
}
