//! Error types for item mapping and rich-text resolution.
//!
//! Messages follow the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that can occur while mapping a response into an item graph.
#[derive(Debug, Clone, Error)]
pub enum MappingError {
    /// The response does not have the shape the mapper requires
    #[error("malformed response for item '{codename}': {reason}\n  Suggestion: {suggestion}")]
    MalformedResponse {
        /// Codename of the offending item, or a placeholder when unknown
        codename: String,
        /// What is wrong with the payload
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// An element declared a type string the mapper does not know
    #[error(
        "unsupported field type '{field_type}' for element '{element}' of item '{codename}'\n  Suggestion: Upgrade the SDK or map the item with lenient field types"
    )]
    UnsupportedFieldType {
        /// Item containing the element
        codename: String,
        /// Element codename
        element: String,
        /// The unrecognised type string
        field_type: String,
    },

    /// An element value does not match its declared type
    #[error("invalid value for {field_type} element '{element}' of item '{codename}': {reason}")]
    InvalidFieldValue {
        /// Item containing the element
        codename: String,
        /// Element codename
        element: String,
        /// Declared element type
        field_type: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A linked item referenced by an element is not part of the response
    #[error(
        "linked item '{linked}' referenced by element '{element}' of item '{codename}' is missing from the response\n  Suggestion: Increase the depth parameter of the query"
    )]
    LinkedItemNotFound {
        /// Item containing the reference
        codename: String,
        /// Element codename
        element: String,
        /// The missing linked item codename
        linked: String,
    },

    /// A rich-text image placeholder has no matching image in the response
    #[error(
        "image '{image_id}' used in rich-text element '{element}' of item '{codename}' was not found in the response\n  Suggestion: Check that the asset still exists and is published"
    )]
    ImageNotFound {
        /// Item containing the rich text
        codename: String,
        /// Rich-text element codename
        element: String,
        /// Image id from the placeholder
        image_id: String,
    },

    /// Converting a mapped item into a typed model failed
    #[error("cannot convert item '{codename}' into model '{model}': {reason}")]
    ModelConversion {
        /// Item being converted
        codename: String,
        /// Target model type codename
        model: String,
        /// Why the conversion failed
        reason: String,
    },
}

impl MappingError {
    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(codename: &str, reason: &str) -> Self {
        Self::MalformedResponse {
            codename: codename.to_string(),
            reason: reason.to_string(),
            suggestion: "Check that the response comes from the delivery API and was not truncated"
                .to_string(),
        }
    }

    /// Creates an `UnsupportedFieldType` error.
    #[must_use]
    pub fn unsupported_field_type(codename: &str, element: &str, field_type: &str) -> Self {
        Self::UnsupportedFieldType {
            codename: codename.to_string(),
            element: element.to_string(),
            field_type: field_type.to_string(),
        }
    }

    /// Creates an `InvalidFieldValue` error.
    #[must_use]
    pub fn invalid_value(codename: &str, element: &str, field_type: &str, reason: &str) -> Self {
        Self::InvalidFieldValue {
            codename: codename.to_string(),
            element: element.to_string(),
            field_type: field_type.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `LinkedItemNotFound` error.
    #[must_use]
    pub fn linked_item_not_found(codename: &str, element: &str, linked: &str) -> Self {
        Self::LinkedItemNotFound {
            codename: codename.to_string(),
            element: element.to_string(),
            linked: linked.to_string(),
        }
    }

    /// Creates an `ImageNotFound` error.
    #[must_use]
    pub fn image_not_found(codename: &str, element: &str, image_id: &str) -> Self {
        Self::ImageNotFound {
            codename: codename.to_string(),
            element: element.to_string(),
            image_id: image_id.to_string(),
        }
    }

    /// Creates a `ModelConversion` error.
    #[must_use]
    pub fn model_conversion(codename: &str, model: &str, reason: &str) -> Self {
        Self::ModelConversion {
            codename: codename.to_string(),
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_has_suggestion() {
        let err = MappingError::malformed("warrior", "missing `system` attributes");
        let msg = err.to_string();
        assert!(msg.contains("warrior"), "should contain codename");
        assert!(msg.contains("system"), "should contain reason");
        assert!(msg.contains("Suggestion"), "should have suggestion");
    }

    #[test]
    fn test_unsupported_field_type_message() {
        let err = MappingError::unsupported_field_type("warrior", "rating", "custom");
        let msg = err.to_string();
        assert!(msg.contains("'custom'"));
        assert!(msg.contains("rating"));
        assert!(msg.contains("lenient"));
    }

    #[test]
    fn test_linked_item_not_found_suggests_depth() {
        let err = MappingError::linked_item_not_found("warrior", "stars", "tom_hardy");
        let msg = err.to_string();
        assert!(msg.contains("tom_hardy"));
        assert!(msg.contains("stars"));
        assert!(msg.contains("depth"));
    }

    #[test]
    fn test_image_not_found_message() {
        let err = MappingError::image_not_found("warrior", "plot", "abc-123");
        let msg = err.to_string();
        assert!(msg.contains("abc-123"));
        assert!(msg.contains("plot"));
    }

    #[test]
    fn test_invalid_value_message() {
        let err = MappingError::invalid_value("warrior", "length", "number", "expected a number");
        assert!(err.to_string().contains("number element 'length'"));
    }

    #[test]
    fn test_mapping_error_clone() {
        let err = MappingError::model_conversion("warrior", "movie", "missing title");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
