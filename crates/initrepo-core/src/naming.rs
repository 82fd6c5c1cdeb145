use std::fmt;

use anyhow::Result;
use regex::Regex;

use crate::ScaffoldError;

/// A validated, hyphen-delimited project name such as `animal-tracker`.
///
/// Every segment between hyphens is non-empty, so the casing transforms below
/// never have to deal with a missing first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(raw: &str) -> Result<Self> {
        let reject = |reason: &str| -> anyhow::Error {
            ScaffoldError::InvalidProjectName {
                name: raw.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if raw.is_empty() {
            return Err(reject("the name is empty"));
        }
        if raw.split('-').any(str::is_empty) {
            return Err(reject(
                "every hyphen-separated segment must be non-empty (no leading, trailing or doubled hyphens)",
            ));
        }
        if raw == "." || raw == ".." {
            return Err(reject("the name cannot be a relative path component"));
        }

        let allowed = Regex::new(r"^[^\s/\\]+$")?;
        if !allowed.is_match(raw) {
            return Err(reject("the name cannot contain whitespace or path separators"));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.as_str().split('-')
    }

    /// Folder name the API root is renamed to.
    pub fn api_folder_name(&self) -> String {
        format!("{}-api", self.as_str())
    }

    /// Folder name the frontend root is renamed to.
    pub fn frontend_folder_name(&self) -> String {
        self.as_str().to_string()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// `animal-tracker` -> `AnimalTracker`
    Pascal,
    /// `animal-tracker` -> `Animal Tracker`
    Title,
}

impl CaseStyle {
    pub fn apply(self, name: &ProjectName) -> String {
        match self {
            CaseStyle::Pascal => to_pascal_like_name(name),
            CaseStyle::Title => to_title_like_name(name),
        }
    }
}

pub fn to_pascal_like_name(name: &ProjectName) -> String {
    name.segments().map(capitalize).collect()
}

pub fn to_title_like_name(name: &ProjectName) -> String {
    name.segments().map(capitalize).collect::<Vec<_>>().join(" ")
}

// Only the first character changes; the rest of the segment is kept as written.
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> ProjectName {
        ProjectName::parse(raw).unwrap()
    }

    #[test]
    fn test_pascal_like_name() {
        assert_eq!(to_pascal_like_name(&name("animal-tracker")), "AnimalTracker");
        assert_eq!(to_pascal_like_name(&name("zoo")), "Zoo");
        assert_eq!(to_pascal_like_name(&name("my-big-app")), "MyBigApp");
    }

    #[test]
    fn test_title_like_name() {
        assert_eq!(to_title_like_name(&name("animal-tracker")), "Animal Tracker");
        assert_eq!(to_title_like_name(&name("zoo")), "Zoo");
        assert_eq!(to_title_like_name(&name("my-big-app")), "My Big App");
    }

    #[test]
    fn test_only_first_character_is_changed() {
        assert_eq!(to_pascal_like_name(&name("iot-hUB")), "IotHUB");
        assert_eq!(to_title_like_name(&name("v2-api")), "V2 Api");
        assert_eq!(to_title_like_name(&name("2fa-tool")), "2fa Tool");
    }

    #[test]
    fn test_transforms_are_built_from_segments() {
        for raw in ["animal-tracker", "a-b-c", "single", "x1-y2-z3", "über-app"] {
            let project = name(raw);
            let capitalized: Vec<String> = project.segments().map(capitalize).collect();

            let pascal = to_pascal_like_name(&project);
            assert!(!pascal.contains('-'));
            assert!(!pascal.contains(' '));
            assert_eq!(pascal, capitalized.concat());

            assert_eq!(to_title_like_name(&project), capitalized.join(" "));
        }
    }

    #[test]
    fn test_case_style_apply() {
        let project = name("animal-tracker");
        assert_eq!(CaseStyle::Pascal.apply(&project), "AnimalTracker");
        assert_eq!(CaseStyle::Title.apply(&project), "Animal Tracker");
    }

    #[test]
    fn test_folder_names() {
        let project = name("animal-tracker");
        assert_eq!(project.api_folder_name(), "animal-tracker-api");
        assert_eq!(project.frontend_folder_name(), "animal-tracker");
    }

    #[test]
    fn test_name_is_kept_verbatim() {
        let project = name("Bird-watcher");
        assert_eq!(project.as_str(), "Bird-watcher");
        assert_eq!(project.to_string(), project.as_str());
        assert_eq!(project.frontend_folder_name(), project.as_str());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        for raw in ["", "-animal", "animal-", "animal--tracker", "-", "animal tracker", "a/b", "..", "a\\b"] {
            let err = ProjectName::parse(raw).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ScaffoldError>(),
                    Some(ScaffoldError::InvalidProjectName { .. })
                ),
                "expected validation error for {:?}, got {}",
                raw,
                err
            );
        }
    }
}
