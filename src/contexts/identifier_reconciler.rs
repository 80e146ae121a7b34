//! Recomputes the bundle identifiers the converter writes by mistake.
//!
//! The converter drops the last reverse-DNS component of the requested
//! identifier and puts the hyphenated app name in its place. The extension
//! target gets the same value with `.Extension` appended. This must match the
//! converter exactly or nothing will be found to correct; update it together
//! with the pinned regression tests below when the converter changes.

use crate::data::IdentifierPair;

const WRONG_EXTENSION_SUFFIX: &str = ".Extension";

/// The identifiers the converter derives from `requested_app_identifier`
/// and `app_display_name`.
pub fn reconcile(requested_app_identifier: &str, app_display_name: &str) -> IdentifierPair {
    let mut components: Vec<&str> = requested_app_identifier.split('.').collect();
    components.pop();

    let hyphenated_name = app_display_name.replace(' ', "-");
    components.push(&hyphenated_name);

    let app_identifier = components.join(".");
    let extension_identifier = format!("{}{}", app_identifier, WRONG_EXTENSION_SUFFIX);

    IdentifierPair {
        app_identifier,
        extension_identifier,
    }
}
