// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! General-purpose utilities used throughout the asic-tool crate.

use crate::error::{Error, Result, ToolErrorKind};

/// Utility to get a string value either from a command-line option or a named environment variable.
pub fn get_config_from_command_or_env(
    config_option: &Option<String>,
    env_var_name: &str,
    purpose: &str,
) -> Result<String> {
    match config_option {
        Some(o) => Ok(o.clone()),
        // The option isn't on the command-line, so examine the environment variable instead
        None => match std::env::var(env_var_name) {
            Ok(env) => Ok(env),
            Err(_) => {
                println!("No {} specified. Please specify on the command-line or by setting the `{}` environment variable.", purpose, env_var_name);
                Err(Error::ToolError(ToolErrorKind::MissingConfiguration))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::get_config_from_command_or_env;

    #[test]
    fn test_command_line_wins() {
        let value = get_config_from_command_or_env(
            &Some(String::from("key.pem")),
            "ASIC_TOOL_TEST_UNSET_VARIABLE",
            "signing key",
        )
        .unwrap();
        assert_eq!(value, "key.pem");
    }

    #[test]
    fn test_missing_configuration() {
        assert!(
            get_config_from_command_or_env(&None, "ASIC_TOOL_TEST_UNSET_VARIABLE", "signing key")
                .is_err()
        );
    }
}
