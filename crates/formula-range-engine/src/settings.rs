use core::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Knobs for [`crate::ReferenceResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverSettings {
    /// Maximum number of labels followed in one chain (`A -> B -> C` is a chain of three).
    ///
    /// Chains longer than this resolve to nothing, like unknown labels. Cycles are detected
    /// independently of this limit. A depth of zero would disable labels entirely, so it is
    /// rejected when the settings are deserialized.
    pub max_label_depth: NonZeroUsize,
}

impl ResolverSettings {
    pub const DEFAULT_MAX_LABEL_DEPTH: NonZeroUsize = match NonZeroUsize::new(64) {
        Some(depth) => depth,
        None => panic!("default label depth must be non-zero"),
    };

    /// Settings with a custom depth; `None` when `max_label_depth` is zero.
    pub fn with_max_label_depth(max_label_depth: usize) -> Option<Self> {
        NonZeroUsize::new(max_label_depth).map(|max_label_depth| Self { max_label_depth })
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_label_depth: Self::DEFAULT_MAX_LABEL_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: ResolverSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ResolverSettings::default());

        let settings: ResolverSettings = serde_json::from_str(r#"{"maxLabelDepth":3}"#).unwrap();
        assert_eq!(settings.max_label_depth.get(), 3);
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert!(serde_json::from_str::<ResolverSettings>(r#"{"maxLabelDepth":0}"#).is_err());
        assert_eq!(ResolverSettings::with_max_label_depth(0), None);
        assert_eq!(
            ResolverSettings::with_max_label_depth(64),
            Some(ResolverSettings::default())
        );
    }
}
