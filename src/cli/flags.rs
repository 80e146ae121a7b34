use swext::config::ConvertRequest;

pub const CONVERTER_TOOL: &str = "safari-web-extension-converter";

pub enum FlagValue<'a> {
    Switch(Option<bool>),
    Value(Option<&'a str>),
}

/// Renders one converter flag: `--name` for a set switch, `--name value` for
/// a non-empty value, nothing otherwise.
pub fn flag(name: &str, value: FlagValue<'_>) -> Vec<String> {
    match value {
        FlagValue::Switch(Some(true)) => vec![format!("--{}", name)],
        FlagValue::Value(Some(v)) if !v.is_empty() => vec![format!("--{}", name), v.to_string()],
        _ => Vec::new(),
    }
}

/// Argument vector for the launcher, starting with the converter tool name
pub fn converter_args(request: &ConvertRequest) -> Vec<String> {
    let extension = request
        .extension
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let project_location = request
        .project_location
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());

    let mut args = vec![CONVERTER_TOOL.to_string(), extension];
    args.extend(flag("no-prompt", FlagValue::Switch(Some(true))));
    args.extend(flag("no-open", FlagValue::Switch(Some(true))));
    args.extend(flag("project-location", FlagValue::Value(project_location.as_deref())));
    args.extend(flag("rebuild-project", FlagValue::Switch(request.rebuild_project)));
    args.extend(flag("app-name", FlagValue::Value(request.app_name.as_deref())));
    args.extend(flag(
        "bundle-identifier",
        FlagValue::Value(request.bundle_identifier.as_deref()),
    ));
    args.extend(flag("swift", FlagValue::Switch(Some(request.swift()))));
    args.extend(flag("objc", FlagValue::Switch(Some(request.objc()))));
    args.extend(flag("ios-only", FlagValue::Switch(request.ios_only)));
    args.extend(flag("mac-only", FlagValue::Switch(request.mac_only)));
    args.extend(flag("copy-resources", FlagValue::Switch(request.copy_resources)));
    args.extend(flag("force", FlagValue::Switch(request.force)));
    args
}

/// Shell-like rendering of a command for display and run logs
pub fn command_line(launcher: &str, args: &[String]) -> String {
    std::iter::once(launcher)
        .chain(args.iter().map(String::as_str))
        .map(|part| {
            if part.is_empty() || part.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                format!("'{}'", part.replace('\'', "'\\''"))
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
