use serde_yaml::{Mapping, Value};

/// Value used for a recognized token whose variable is not set.
pub const NOT_SET: &str = "ERRORNOTSET";

/// CI variables that may be referenced from the release descriptor.
///
/// Ordered longest name first: `$CI_SERVER_NAME` has to be tried before its
/// prefix `$CI_SERVER`.
pub const CI_VARIABLES: &[&str] = &[
    "CI_SERVER_VERSION_MAJOR",
    "CI_SERVER_VERSION_MINOR",
    "CI_SERVER_VERSION_PATCH",
    "CI_RUNNER_DESCRIPTION",
    "CI_PROJECT_NAMESPACE",
    "CI_REGISTRY_PASSWORD",
    "CI_COMMIT_SHORT_SHA",
    "CI_COMMIT_REF_NAME",
    "CI_SERVER_REVISION",
    "CI_REPOSITORY_URL",
    "CI_REGISTRY_IMAGE",
    "CI_SERVER_VERSION",
    "GITLAB_USER_EMAIL",
    "CI_JOB_TRIGGERED",
    "CI_REGISTRY_USER",
    "CI_PIPELINE_IID",
    "CI_PAGES_DOMAIN",
    "CI_PROJECT_NAME",
    "CI_PROJECT_PATH",
    "CI_PIPELINE_ID",
    "CI_PROJECT_DIR",
    "CI_PROJECT_URL",
    "CI_RUNNER_TAGS",
    "CI_SERVER_NAME",
    "GITLAB_USER_ID",
    "CI_COMMIT_SHA",
    "CI_COMMIT_TAG",
    "CI_JOB_MANUAL",
    "CI_PROJECT_ID",
    "CI_JOB_STAGE",
    "CI_JOB_TOKEN",
    "CI_PAGES_URL",
    "CI_RUNNER_ID",
    "CI_JOB_NAME",
    "CI_REGISTRY",
    "CI_JOB_ID",
    "CI_SERVER",
];

/// Environment lookup used by the substitution pass.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads variables from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Replaces every recognized token in `input`, both `$NAME` and `${NAME}`.
///
/// Single left-to-right pass: replacement text is copied to the output as is
/// and never scanned for further tokens.
pub fn substitute(input: &str, env: EnvLookup<'_>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        output.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        match match_token(after) {
            Some((name, consumed)) => {
                let value = env(name).unwrap_or_else(|| NOT_SET.to_string());
                output.push_str(&value);
                rest = &after[consumed..];
            }
            None => {
                output.push('$');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Finds the recognized variable starting right after a `$`.
///
/// Returns the variable name and how many bytes of `text` the token spans.
fn match_token(text: &str) -> Option<(&'static str, usize)> {
    if let Some(inner) = text.strip_prefix('{') {
        return CI_VARIABLES.iter().find_map(|name| {
            inner
                .strip_prefix(name)
                .filter(|tail| tail.starts_with('}'))
                .map(|_| (*name, name.len() + 2))
        });
    }

    CI_VARIABLES
        .iter()
        .find(|name| text.starts_with(*name))
        .map(|name| (*name, name.len()))
}

/// Runs [`substitute`] over every top-level string value of the mapping.
pub fn substitute_mapping(mapping: &mut Mapping, env: EnvLookup<'_>) {
    for (_, value) in mapping.iter_mut() {
        if let Value::String(text) = value {
            *text = substitute(text, env);
        }
    }
}
