// ── Device manifest templates ──

use plist::{Dictionary, Value};

use crate::manifest::document::{CATALOGS, DISPLAY_NAME, INCLUDED_MANIFESTS, ManifestDocument};

/// Catalog every device manifest starts on.
pub const PRODUCTION_CATALOG: &str = "production";

/// Includes shared by every device manifest.
pub const BASE_INCLUDES: [&str; 3] = [
    "includes/apple_apps",
    "includes/common_base",
    "includes/optional_apps",
];

/// Extra include for devices with an assigned user.
pub const ASSIGNED_INCLUDE: &str = "includes/security";

/// Initial manifest for a device; `username` is empty when unassigned.
pub fn device_manifest(username: &str) -> ManifestDocument {
    let mut root = Dictionary::new();

    if !username.is_empty() {
        root.insert(DISPLAY_NAME.into(), strings([username]));
    }
    root.insert(CATALOGS.into(), strings([PRODUCTION_CATALOG]));

    let includes = if username.is_empty() {
        strings(BASE_INCLUDES)
    } else {
        strings(BASE_INCLUDES.into_iter().chain([ASSIGNED_INCLUDE]))
    };
    root.insert(INCLUDED_MANIFESTS.into(), includes);

    ManifestDocument::from_dictionary(root)
}

fn strings<'a>(items: impl IntoIterator<Item = &'a str>) -> Value {
    Value::Array(items.into_iter().map(|s| Value::String(s.to_owned())).collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unassigned_template() {
        let doc = device_manifest("");
        assert_eq!(doc.display_name(), None);
        assert_eq!(doc.catalogs(), vec!["production"]);
        assert_eq!(doc.included_manifests(), BASE_INCLUDES.to_vec());
    }

    #[test]
    fn assigned_template() {
        let doc = device_manifest("jdoe");
        assert_eq!(doc.display_name(), Some("jdoe"));
        assert_eq!(doc.catalogs(), vec!["production"]);
        assert_eq!(
            doc.included_manifests(),
            vec![
                "includes/apple_apps",
                "includes/common_base",
                "includes/optional_apps",
                "includes/security",
            ]
        );
    }
}
