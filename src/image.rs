//! Container image tag handling.

use serde::{Deserialize, Serialize};

/// Registry and versioned-image halves of a container image tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    /// The registry host, empty when the tag names no registry.
    pub registry: String,
    /// The final image component, tag included.
    pub version_image: String,
}

impl ImageInfo {
    /// Split an image tag into registry and versioned image.
    ///
    /// Text before the first `/` is taken as the registry; text after the
    /// last `/` as the versioned image. A tag without a `/` has no registry.
    pub fn parse(image_tag: &str) -> Self {
        match image_tag.split_once('/') {
            None => Self {
                registry: String::new(),
                version_image: image_tag.to_owned(),
            },
            Some((registry, rest)) => Self {
                registry: registry.to_owned(),
                version_image: rest.rsplit('/').next().unwrap_or("").to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_with_tag() {
        assert_eq!(ImageInfo::parse("myregistry/myimage:latest"), ImageInfo {
            registry: "myregistry".into(),
            version_image: "myimage:latest".into(),
        });
    }

    #[test]
    fn registry_without_tag() {
        assert_eq!(ImageInfo::parse("myregistry/myimage"), ImageInfo {
            registry: "myregistry".into(),
            version_image: "myimage".into(),
        });
    }

    #[test]
    fn no_registry() {
        assert_eq!(ImageInfo::parse("myimage:latest"), ImageInfo {
            registry: "".into(),
            version_image: "myimage:latest".into(),
        });
    }

    #[test]
    fn nested_repository_path() {
        assert_eq!(ImageInfo::parse("quay.io/kubescape/kubescape:v3"), ImageInfo {
            registry: "quay.io".into(),
            version_image: "kubescape:v3".into(),
        });
    }
}
