//! Shared build schemes for every target of a project.
//!
//! Xcode creates schemes per user and unshared, which makes a freshly
//! generated project unusable from automated builds until someone opens it
//! once. Writing one shared scheme per target has the same effect.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pbxproj::{Project, Target};

const SHARED_SCHEMES_DIR: &str = "xcshareddata/xcschemes";
const USER_DATA_DIR: &str = "xcuserdata";
const LAST_UPGRADE_VERSION: &str = "1240";
const SCHEME_VERSION: &str = "1.3";
const LLDB_DEBUGGER: &str = "Xcode.DebuggerFoundation.Debugger.LLDB";
const LLDB_LAUNCHER: &str = "Xcode.DebuggerFoundation.Launcher.LLDB";

/// Writes a shared scheme for every target and removes per-user copies of
/// those schemes. Returns the paths of the written schemes.
pub fn share_schemes(project: &Project) -> Result<Vec<PathBuf>> {
    let targets = project
        .targets()
        .context("Failed to read targets for scheme generation")?;
    let bundle = project.bundle_path();
    let container = project.bundle_name();

    let shared_dir = bundle.join(SHARED_SCHEMES_DIR);
    fs::create_dir_all(&shared_dir)
        .with_context(|| format!("Failed to create {}", shared_dir.display()))?;

    let mut written = Vec::new();
    for target in &targets {
        let file_name = scheme_file_name(&target.name);
        let path = shared_dir.join(&file_name);
        fs::write(&path, render_scheme(target, &container))
            .with_context(|| format!("Failed to write scheme {}", path.display()))?;
        remove_user_schemes(bundle, &file_name)?;
        tracing::debug!(scheme = %path.display(), "wrote shared scheme");
        written.push(path);
    }

    Ok(written)
}

/// Scheme file name for a target. Path separators in the target name are
/// replaced so the scheme stays inside the schemes directory.
fn scheme_file_name(target_name: &str) -> String {
    let stem: String = target_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    let stem = match stem.as_str() {
        "" | "." | ".." => "scheme".to_string(),
        _ => stem,
    };
    format!("{}.xcscheme", stem)
}

fn remove_user_schemes(bundle: &Path, file_name: &str) -> Result<()> {
    let user_data = bundle.join(USER_DATA_DIR);
    if !user_data.is_dir() {
        return Ok(());
    }

    let entries = fs::read_dir(&user_data)
        .with_context(|| format!("Failed to read directory: {}", user_data.display()))?;
    for entry in entries {
        let scheme = entry?.path().join("xcschemes").join(file_name);
        if scheme.is_file() {
            fs::remove_file(&scheme)
                .with_context(|| format!("Failed to remove {}", scheme.display()))?;
        }
    }
    Ok(())
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn configuration_named<'a>(target: &'a Target, preferred: &'a str) -> &'a str {
    target
        .configurations
        .iter()
        .find(|c| c.name == preferred)
        .or_else(|| target.configurations.first())
        .map(|c| c.name.as_str())
        .unwrap_or(preferred)
}

fn buildable_reference(target: &Target, container: &str, indent: &str) -> String {
    let product = target
        .product_file_name
        .clone()
        .unwrap_or_else(|| target.name.clone());
    format!(
        "{indent}<BuildableReference\n\
         {indent}   BuildableIdentifier = \"primary\"\n\
         {indent}   BlueprintIdentifier = \"{id}\"\n\
         {indent}   BuildableName = \"{product}\"\n\
         {indent}   BlueprintName = \"{name}\"\n\
         {indent}   ReferencedContainer = \"container:{container}\">\n\
         {indent}</BuildableReference>\n",
        indent = indent,
        id = escape_attr(&target.id),
        product = escape_attr(&product),
        name = escape_attr(&target.name),
        container = escape_attr(container),
    )
}

fn runnable(target: &Target, container: &str) -> String {
    if !target.is_application() {
        return String::new();
    }
    format!(
        "      <BuildableProductRunnable\n         runnableDebuggingMode = \"0\">\n{}      </BuildableProductRunnable>\n",
        buildable_reference(target, container, "         ")
    )
}

/// The `.xcscheme` document for one target
pub fn render_scheme(target: &Target, container: &str) -> String {
    let debug = escape_attr(configuration_named(target, "Debug"));
    let release = escape_attr(
        target
            .default_configuration_name
            .as_deref()
            .unwrap_or_else(|| configuration_named(target, "Release")),
    );
    let runnable = runnable(target, container);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<Scheme\n   LastUpgradeVersion = \"{}\"\n   version = \"{}\">\n",
        LAST_UPGRADE_VERSION, SCHEME_VERSION
    ));
    xml.push_str(
        "   <BuildAction\n      parallelizeBuildables = \"YES\"\n      buildImplicitDependencies = \"YES\">\n      <BuildActionEntries>\n",
    );
    xml.push_str(
        "         <BuildActionEntry\n            buildForTesting = \"YES\"\n            buildForRunning = \"YES\"\n            buildForProfiling = \"YES\"\n            buildForArchiving = \"YES\"\n            buildForAnalyzing = \"YES\">\n",
    );
    xml.push_str(&buildable_reference(target, container, "            "));
    xml.push_str("         </BuildActionEntry>\n      </BuildActionEntries>\n   </BuildAction>\n");
    xml.push_str(&format!(
        "   <TestAction\n      buildConfiguration = \"{debug}\"\n      selectedDebuggerIdentifier = \"{LLDB_DEBUGGER}\"\n      selectedLauncherIdentifier = \"{LLDB_LAUNCHER}\"\n      shouldUseLaunchSchemeArgsEnv = \"YES\">\n      <Testables>\n      </Testables>\n   </TestAction>\n"
    ));
    xml.push_str(&format!(
        "   <LaunchAction\n      buildConfiguration = \"{debug}\"\n      selectedDebuggerIdentifier = \"{LLDB_DEBUGGER}\"\n      selectedLauncherIdentifier = \"{LLDB_LAUNCHER}\"\n      launchStyle = \"0\"\n      useCustomWorkingDirectory = \"NO\"\n      ignoresPersistentStateOnLaunch = \"NO\"\n      debugDocumentVersioning = \"YES\"\n      debugServiceExtension = \"internal\"\n      allowLocationSimulation = \"YES\">\n{runnable}   </LaunchAction>\n"
    ));
    xml.push_str(&format!(
        "   <ProfileAction\n      buildConfiguration = \"{release}\"\n      shouldUseLaunchSchemeArgsEnv = \"YES\"\n      savedToolIdentifier = \"\"\n      useCustomWorkingDirectory = \"NO\"\n      debugDocumentVersioning = \"YES\">\n{runnable}   </ProfileAction>\n"
    ));
    xml.push_str(&format!(
        "   <AnalyzeAction\n      buildConfiguration = \"{debug}\">\n   </AnalyzeAction>\n"
    ));
    xml.push_str(&format!(
        "   <ArchiveAction\n      buildConfiguration = \"{release}\"\n      revealArchiveInOrganizer = \"YES\">\n   </ArchiveAction>\n"
    ));
    xml.push_str("</Scheme>\n");
    xml
}
